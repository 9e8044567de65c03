use super::cart_store::CartStore;
use super::poller::{PaymentStatusPoller, PollEvent, PollWaker, DEFAULT_POLL_INTERVAL};
use super::{retry, submission};
use crate::domain::order::OneClickOrder;
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::{OrderGatewayArc, PaymentSourceArc, ProductCatalogArc};
use crate::domain::product::Product;
use crate::error::{CheckoutError, Result};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Update delivered to the UI while a checkout is being reconciled.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutUpdate {
    /// A non-terminal status transition (pending, processing).
    Status(PaymentStatus),
    /// Payment reached a success terminal; the cart has been cleared.
    Succeeded(PaymentStatus),
    /// Payment reached a failure terminal; the cart is untouched so the
    /// customer can retry without re-adding items.
    Failed(PaymentStatus),
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub poll_interval: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Sequences cart -> order submission -> payment polling -> terminal
/// outcome, and decides when the cart store is cleared.
pub struct CheckoutEngine {
    cart: CartStore,
    catalog: ProductCatalogArc,
    gateway: OrderGatewayArc,
    payments: PaymentSourceArc,
    config: CheckoutConfig,
}

impl CheckoutEngine {
    pub fn new(
        cart: CartStore,
        catalog: ProductCatalogArc,
        gateway: OrderGatewayArc,
        payments: PaymentSourceArc,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            cart,
            catalog,
            gateway,
            payments,
            config,
        }
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Fetches product reference data with bounded backoff, as an initial
    /// data load.
    pub async fn load_product(&self, product_id: &str) -> Result<Product> {
        let found = retry::with_backoff(
            retry::DEFAULT_ATTEMPTS,
            retry::DEFAULT_BASE_DELAY,
            || self.catalog.product(product_id),
        )
        .await?;
        found.ok_or_else(|| CheckoutError::UnknownProduct(product_id.to_string()))
    }

    /// Submits a one-click order and returns the order id to track.
    pub async fn place_order(&self, order: OneClickOrder) -> Result<String> {
        submission::submit_one_click(&self.gateway, order).await
    }

    /// Starts tracking the payment for `order_id`.
    ///
    /// Entering the flow without an order id is an error so the caller can
    /// redirect away instead of rendering a broken pending view. On a
    /// success terminal the cart is cleared exactly once, even if the
    /// terminal status is observed more than once.
    pub fn watch_payment(
        &self,
        order_id: Option<String>,
        on_update: impl Fn(CheckoutUpdate) + Send + Sync + 'static,
    ) -> Result<CheckoutSession> {
        let order_id = order_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(CheckoutError::MissingOrder)?;

        let poller = PaymentStatusPoller::new(self.payments.clone(), self.config.poll_interval);
        let mut watch = poller.start(order_id);
        let waker = watch.waker();
        let cart = self.cart.clone();

        let task = tokio::spawn(async move {
            let mut finished = false;
            while let Some(event) = watch.next_event().await {
                match event {
                    PollEvent::Status(status) if status.is_success() => {
                        if !finished {
                            finished = true;
                            if let Err(err) = cart.clear().await {
                                tracing::warn!(error = %err, "failed to clear cart after payment");
                            }
                            on_update(CheckoutUpdate::Succeeded(status));
                        }
                    }
                    PollEvent::Status(status) if status.is_terminal() => {
                        if !finished {
                            finished = true;
                            on_update(CheckoutUpdate::Failed(status));
                        }
                    }
                    PollEvent::Status(status) => {
                        if !finished {
                            on_update(CheckoutUpdate::Status(status));
                        }
                    }
                    // Already warn-logged by the poller; the pending view
                    // stays up and the next tick retries.
                    PollEvent::TransientError(_) => {}
                }
            }
        });

        Ok(CheckoutSession { task, waker })
    }
}

/// Handle to an active checkout. Dropping it tears down the consumer task,
/// which in turn cancels the underlying poller.
pub struct CheckoutSession {
    task: JoinHandle<()>,
    waker: PollWaker,
}

impl CheckoutSession {
    /// Forces an immediate status re-fetch (foreground visibility regained).
    pub fn wake(&self) {
        self.waker.wake();
    }

    /// Cancels polling. Idempotent; safe after natural termination.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Waits for the payment to reach a terminal state.
    pub async fn finished(&mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
