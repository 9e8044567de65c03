//! Application layer: the cart store, order submission, payment status
//! polling, and the checkout orchestration that ties them together.

pub mod cart_store;
pub mod checkout;
pub mod poller;
pub mod retry;
pub mod submission;
