mod result_set;

pub use result_set::{DmlOutcome, ResultSet};
