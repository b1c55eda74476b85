mod broker;
mod figure;
mod support;
