pub mod common;

pub mod a101_financial_survey;
pub mod a102_payroll;
pub mod a103_loan;
pub mod a104_write_off;
