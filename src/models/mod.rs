pub mod alert;
pub mod consultation;
pub mod dashboard;
pub mod enums;
pub mod patient;
pub mod threshold;

pub use alert::*;
pub use consultation::*;
pub use dashboard::*;
pub use patient::*;
pub use threshold::*;
