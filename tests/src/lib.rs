//! In-memory [`IpAssetClient`] for exercising workflows without a chain.

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use helpers::{
    ClaimRevenueRequest, ClaimRevenueResponse, ClientError, IpAssetClient, PayRoyaltyRequest,
    PayRoyaltyResponse, RegisterDerivativeRequest, RegisterDerivativeResponse,
    RegisterRootRequest, RegisterRootResponse, Step,
};
use tokio::sync::Notify;

/// Root IP id returned by default.
pub const ROOT_IP_ID: Address = Address::new([0x0a; 20]);
/// Derivative IP id returned by default.
pub const CHILD_IP_ID: Address = Address::new([0x0c; 20]);

/// A request received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RegisterRoot(RegisterRootRequest),
    RegisterDerivative(RegisterDerivativeRequest),
    PayRoyalty(PayRoyaltyRequest),
    ClaimRevenue(ClaimRevenueRequest),
}

impl Call {
    pub fn step(&self) -> Step {
        match self {
            Call::RegisterRoot(_) => Step::RegisterRoot,
            Call::RegisterDerivative(_) => Step::RegisterDerivative,
            Call::PayRoyalty(_) => Step::PayRoyalty,
            Call::ClaimRevenue(_) => Step::ClaimRevenue,
        }
    }
}

/// Call lifecycle as seen by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Invoked(Step),
    Returned(Step),
}

pub struct MockIpAssetClient {
    root: RegisterRootResponse,
    derivative: RegisterDerivativeResponse,
    payment: PayRoyaltyResponse,
    claim: ClaimRevenueResponse,
    fail_at: Option<Step>,
    hang_at: Option<Step>,
    confirmation_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<Call>>,
    events: Mutex<Vec<Event>>,
}

impl Default for MockIpAssetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIpAssetClient {
    pub fn new() -> Self {
        Self {
            root: RegisterRootResponse {
                tx_hash: TxHash::repeat_byte(0x01),
                ip_id: Some(ROOT_IP_ID),
                token_id: Some(U256::from(1)),
                license_terms_ids: vec![U256::from(7)],
            },
            derivative: RegisterDerivativeResponse {
                tx_hash: TxHash::repeat_byte(0x02),
                child_ip_id: Some(CHILD_IP_ID),
                token_id: Some(U256::from(2)),
            },
            payment: PayRoyaltyResponse {
                tx_hash: TxHash::repeat_byte(0x03),
            },
            claim: ClaimRevenueResponse {
                tx_hash: TxHash::repeat_byte(0x04),
                snapshot_id: Some(U256::from(1)),
                amounts_claimed: vec![U256::from(1)],
            },
            fail_at: None,
            hang_at: None,
            confirmation_gate: None,
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_root_response(mut self, root: RegisterRootResponse) -> Self {
        self.root = root;
        self
    }

    pub fn with_derivative_response(mut self, derivative: RegisterDerivativeResponse) -> Self {
        self.derivative = derivative;
        self
    }

    pub fn with_claim_response(mut self, claim: ClaimRevenueResponse) -> Self {
        self.claim = claim;
        self
    }

    /// Makes the call for `step` fail with a revert.
    pub fn failing_at(mut self, step: Step) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Makes the call for `step` never return.
    pub fn hanging_at(mut self, step: Step) -> Self {
        self.hang_at = Some(step);
        self
    }

    /// Calls that request confirmation wait for one `notify_one` on `gate`
    /// before returning.
    pub fn with_confirmation_gate(mut self, gate: Arc<Notify>) -> Self {
        self.confirmation_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn invoked_steps(&self) -> Vec<Step> {
        self.calls().iter().map(Call::step).collect()
    }

    async fn respond<T>(&self, call: Call, wait: bool, response: T) -> Result<T, ClientError> {
        let step = call.step();
        self.calls.lock().unwrap().push(call);
        self.events.lock().unwrap().push(Event::Invoked(step));

        if self.hang_at == Some(step) {
            std::future::pending::<()>().await;
        }
        if self.fail_at == Some(step) {
            return Err(ClientError::Reverted {
                tx_hash: None,
                reason: format!("mock revert in {step}"),
            });
        }
        if wait {
            if let Some(gate) = &self.confirmation_gate {
                gate.notified().await;
            }
        }

        self.events.lock().unwrap().push(Event::Returned(step));
        Ok(response)
    }
}

#[async_trait]
impl IpAssetClient for MockIpAssetClient {
    async fn mint_and_register_ip_with_terms(
        &self,
        request: RegisterRootRequest,
    ) -> Result<RegisterRootResponse, ClientError> {
        let wait = request.tx.wait_for_transaction;
        self.respond(Call::RegisterRoot(request), wait, self.root.clone())
            .await
    }

    async fn mint_and_register_derivative(
        &self,
        request: RegisterDerivativeRequest,
    ) -> Result<RegisterDerivativeResponse, ClientError> {
        let wait = request.tx.wait_for_transaction;
        self.respond(
            Call::RegisterDerivative(request),
            wait,
            self.derivative.clone(),
        )
        .await
    }

    async fn pay_royalty_on_behalf(
        &self,
        request: PayRoyaltyRequest,
    ) -> Result<PayRoyaltyResponse, ClientError> {
        let wait = request.tx.wait_for_transaction;
        self.respond(Call::PayRoyalty(request), wait, self.payment.clone())
            .await
    }

    async fn claim_revenue(
        &self,
        request: ClaimRevenueRequest,
    ) -> Result<ClaimRevenueResponse, ClientError> {
        let wait = request.tx.wait_for_transaction;
        self.respond(Call::ClaimRevenue(request), wait, self.claim.clone())
            .await
    }
}
