//! Domain types and the ports through which the checkout core talks to its
//! collaborators (snapshot storage, product catalog, order gateway, payment
//! status source).

pub mod cart;
pub mod order;
pub mod payment;
pub mod ports;
pub mod product;
