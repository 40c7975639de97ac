//! Data models for Biblion

pub mod book;
pub mod fine;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use book::Book;
pub use fine::{Fine, OutstandingFine};
pub use loan::{BorrowingLog, LoanDetails, LoanStatus};
pub use member::Member;
