pub mod forecast_date;
