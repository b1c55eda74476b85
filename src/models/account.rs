use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct AccountBalance {
    balance: Decimal,
    date: NaiveDate,
}

/// Cash to be delivered on `date`, `t` trading days after the trade.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct Settlement {
    date: NaiveDate,
    amount: Decimal,
    t: i32,
}
