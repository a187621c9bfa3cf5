pub mod billing_month;
pub mod cost_filter;
pub mod period;
pub mod price;
pub mod service_name;
pub mod subscription;
