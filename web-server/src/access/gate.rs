// web-server/src/access/gate.rs
use std::sync::Arc;

use super::oracle::OwnershipOracle;
use super::resolver::{RequestCredentials, SessionResolver};
use super::GateError;

// Every deny path lands on the login page, whatever the cause
const LOGIN_PATH: &str = "/login";

/// Outcome of evaluating a request against the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the protected content
    Allow,
    /// Send the caller to the login page instead
    DenyWithRedirect {
        destination: String,
        permanent: bool,
    },
}

impl AccessDecision {
    fn deny() -> Self {
        AccessDecision::DenyWithRedirect {
            destination: LOGIN_PATH.to_string(),
            permanent: false,
        }
    }
}

/// Combines the session resolver and the ownership oracle into a single
/// allow-or-redirect decision for the protected page
///
/// Both collaborators are injected, so the decision procedure can be
/// exercised without a network or a key in sight.
pub struct AccessGate {
    resolver: Arc<dyn SessionResolver>,
    oracle: Arc<dyn OwnershipOracle>,
    program_address: String,
}

impl AccessGate {
    pub fn new(
        resolver: Arc<dyn SessionResolver>,
        oracle: Arc<dyn OwnershipOracle>,
        program_address: String,
    ) -> Self {
        Self {
            resolver,
            oracle,
            program_address,
        }
    }

    /// Evaluate one inbound request
    ///
    /// An unauthenticated caller is denied without consulting the oracle.
    /// An authenticated caller is allowed only when some claimed record's
    /// owner equals the caller's address, byte for byte. Collaborator
    /// faults propagate to the caller instead of turning into a deny.
    pub async fn evaluate(&self, creds: &RequestCredentials) -> Result<AccessDecision, GateError> {
        let principal = match self.resolver.resolve(creds).await? {
            Some(principal) => principal,
            None => {
                tracing::debug!("No session resolved, denying");
                return Ok(AccessDecision::deny());
            }
        };

        // Absent and empty are the same thing here: no claimed records
        let claimed = self
            .oracle
            .list_claimed(&self.program_address)
            .await?
            .unwrap_or_default();

        let holds_claim = claimed
            .iter()
            .any(|record| record.owner == principal.address);

        if holds_claim {
            tracing::debug!("Wallet {} holds a claimed unit, allowing", principal.address);
            Ok(AccessDecision::Allow)
        } else {
            tracing::debug!("Wallet {} holds no claimed unit, denying", principal.address);
            Ok(AccessDecision::deny())
        }
    }
}
