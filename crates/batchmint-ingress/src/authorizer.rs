//! Deposit admission.
//!
//! Every way into the pool ends here. The [`Authorizer`] establishes who
//! the effective depositor is, pulls the underlying into the pool, and
//! only then hands back a [`ValidatedDeposit`] for the ledger to record.
//!
//! ## Paths
//!
//! - **Direct**: pull against an allowance the caller already granted
//! - **Permit**: the token verifies a signed permit, then the pull happens
//! - **Relayed**: the trusted forwarder delivers a signed request; the
//!   signer, never the forwarder, is the depositor
//!
//! Pause gating is the caller's job; the authorizer doesn't know about it.

use batchmint_types::{
    AdmissionPath, Address, Amount, BatchMintError, ForwardRequest, Permit, PermitSignature,
    RelayedAction, Result, TokenHost, ValidatedDeposit,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ForwarderRegistry, RelayNonces, SignerRecovery};

/// A relayed deposit whose underlying is already in the pool but whose
/// relay nonce is still unconsumed.
///
/// Record the deposit, then hand this to [`Authorizer::settle_relay`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayAdmission {
    pub deposit: ValidatedDeposit,
    pub nonce: u64,
}

/// Admission state of one pool: its identity, the trusted forwarder and
/// the relay nonces consumed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorizer {
    /// The pool contract; spender of every pull.
    pool: Address,
    /// Token deposits are denominated in.
    underlying: Address,
    forwarder: ForwarderRegistry,
    #[serde(default)]
    relay_nonces: RelayNonces,
}

impl Authorizer {
    #[must_use]
    pub fn new(pool: Address, underlying: Address) -> Self {
        Self {
            pool,
            underlying,
            forwarder: ForwarderRegistry::new(),
            relay_nonces: RelayNonces::new(),
        }
    }

    #[must_use]
    pub fn pool(&self) -> Address {
        self.pool
    }

    #[must_use]
    pub fn underlying(&self) -> Address {
        self.underlying
    }

    #[must_use]
    pub fn forwarder(&self) -> &ForwarderRegistry {
        &self.forwarder
    }

    #[must_use]
    pub fn relay_nonces(&self) -> &RelayNonces {
        &self.relay_nonces
    }

    /// One-time trusted forwarder setup. Owner gating is the caller's job.
    ///
    /// # Errors
    /// Returns `ForwarderAlreadyInitialized` on any call after the first.
    pub fn init_trusted_forwarder(
        &mut self,
        version: impl Into<String>,
        address: Address,
    ) -> Result<()> {
        self.forwarder.initialize(version, address)
    }

    /// Admit a direct deposit from `sender`.
    ///
    /// # Errors
    /// `ZeroAmount`, or the token's `InsufficientAllowance` / `InsufficientBalance`.
    pub fn admit_direct<H: TokenHost>(
        &self,
        host: &mut H,
        sender: Address,
        amount: Amount,
    ) -> Result<ValidatedDeposit> {
        self.pull(host, sender, amount, AdmissionPath::Direct)
    }

    /// Admit a permit-authorized deposit from `sender`.
    ///
    /// The permit must name `sender` as holder and the pool as spender with
    /// `allowed = true`; anything else fails signature verification.
    ///
    /// # Errors
    /// `ZeroAmount`, any permit error raised by the token, or a pull error.
    pub fn admit_permit<H: TokenHost>(
        &self,
        host: &mut H,
        sender: Address,
        amount: Amount,
        nonce: u64,
        deadline: DateTime<Utc>,
        signature: &PermitSignature,
    ) -> Result<ValidatedDeposit> {
        self.permit_then_pull(
            host,
            sender,
            amount,
            nonce,
            deadline,
            signature,
            AdmissionPath::Permit,
        )
    }

    /// Admit a deposit relayed by `sender` on behalf of the request's signer.
    ///
    /// The signer's relay nonce is checked but not consumed.
    ///
    /// # Errors
    /// `UntrustedForwarder`, `RelayRecipientMismatch`, `RelaySignatureInvalid`,
    /// `RelayNonceMismatch`, then any error of the underlying path.
    pub fn admit_relayed<H: TokenHost, R: SignerRecovery>(
        &self,
        host: &mut H,
        recovery: &R,
        sender: Address,
        request: &ForwardRequest,
    ) -> Result<RelayAdmission> {
        // 1. Literal sender must be the trusted forwarder
        self.forwarder.ensure_trusted(sender)?;

        // 2. Request must be addressed to this pool
        if request.recipient != self.pool {
            return Err(BatchMintError::RelayRecipientMismatch(request.recipient));
        }

        // 3. Effective depositor comes from the request, not the sender
        let signer = recovery.recover_signer(sender, request)?;

        // 4. Replay protection
        self.relay_nonces.check(signer, request.nonce)?;

        debug!(
            forwarder = %sender,
            signer = %signer,
            nonce = request.nonce,
            "Relayed deposit accepted"
        );

        let deposit = match &request.action {
            RelayedAction::Deposit { amount } => {
                self.pull(host, signer, *amount, AdmissionPath::Relayed)?
            }
            RelayedAction::PermitAndDeposit {
                amount,
                nonce,
                deadline,
                permit_signature,
            } => self.permit_then_pull(
                host,
                signer,
                *amount,
                *nonce,
                *deadline,
                permit_signature,
                AdmissionPath::RelayedPermit,
            )?,
        };
        Ok(RelayAdmission {
            deposit,
            nonce: request.nonce,
        })
    }

    /// Consume the relay nonce of an admitted request and release its deposit.
    pub fn settle_relay(&mut self, admission: RelayAdmission) -> ValidatedDeposit {
        self.relay_nonces
            .advance(admission.deposit.depositor, admission.nonce);
        admission.deposit
    }

    #[allow(clippy::too_many_arguments)]
    fn permit_then_pull<H: TokenHost>(
        &self,
        host: &mut H,
        holder: Address,
        amount: Amount,
        nonce: u64,
        deadline: DateTime<Utc>,
        signature: &PermitSignature,
        path: AdmissionPath,
    ) -> Result<ValidatedDeposit> {
        if amount == 0 {
            return Err(BatchMintError::ZeroAmount);
        }
        let permit = Permit {
            token: self.underlying,
            holder,
            spender: self.pool,
            nonce,
            deadline,
            allowed: true,
        };
        host.permit(&permit, signature)?;
        self.pull(host, holder, amount, path)
    }

    fn pull<H: TokenHost>(
        &self,
        host: &mut H,
        depositor: Address,
        amount: Amount,
        path: AdmissionPath,
    ) -> Result<ValidatedDeposit> {
        if amount == 0 {
            return Err(BatchMintError::ZeroAmount);
        }
        host.transfer_from(self.underlying, self.pool, depositor, self.pool, amount)?;
        Ok(ValidatedDeposit {
            depositor,
            amount,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use batchmint_host::InMemoryChain;
    use batchmint_types::TestAccount;
    use chrono::Duration;

    use super::*;
    use crate::{Ed25519SignerRecovery, ForwarderAttestedRecovery};

    const VERSION: &str = "2.0.0-alpha.1+opengsn.test.recipient";

    struct Fixture {
        chain: InMemoryChain,
        auth: Authorizer,
        dai: Address,
        pool: Address,
        forwarder: Address,
    }

    fn fixture() -> Fixture {
        let mut chain = InMemoryChain::new();
        let dai = chain.deploy_token("DAI");
        let pool = Address::from_label("pool");
        let forwarder = Address::from_label("forwarder");
        let mut auth = Authorizer::new(pool, dai);
        auth.init_trusted_forwarder(VERSION, forwarder).unwrap();
        Fixture {
            chain,
            auth,
            dai,
            pool,
            forwarder,
        }
    }

    fn funded(f: &mut Fixture, amount: Amount) -> TestAccount {
        let user = TestAccount::random();
        f.chain.mint(f.dai, user.address(), amount).unwrap();
        user
    }

    #[test]
    fn direct_pulls_from_caller() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        f.chain.approve(f.dai, user.address(), f.pool, 40).unwrap();

        let dep = f.auth.admit_direct(&mut f.chain, user.address(), 40).unwrap();
        assert_eq!(dep.depositor, user.address());
        assert_eq!(dep.amount, 40);
        assert_eq!(dep.path, AdmissionPath::Direct);
        assert_eq!(f.chain.balance_of(f.dai, f.pool), 40);
        assert_eq!(f.chain.balance_of(f.dai, user.address()), 60);
    }

    #[test]
    fn direct_without_allowance_rejected() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let err = f
            .auth
            .admit_direct(&mut f.chain, user.address(), 10)
            .unwrap_err();
        assert!(matches!(err, BatchMintError::InsufficientAllowance { .. }));
    }

    #[test]
    fn zero_amount_rejected() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let err = f
            .auth
            .admit_direct(&mut f.chain, user.address(), 0)
            .unwrap_err();
        assert!(matches!(err, BatchMintError::ZeroAmount));
    }

    #[test]
    fn permit_grants_allowance_and_pulls() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let deadline = f.chain.block_time() + Duration::hours(1);
        let sig = user.permit_for(f.dai, f.pool, 0, deadline);

        let dep = f
            .auth
            .admit_permit(&mut f.chain, user.address(), 30, 0, deadline, &sig)
            .unwrap();
        assert_eq!(dep.path, AdmissionPath::Permit);
        assert_eq!(f.chain.balance_of(f.dai, f.pool), 30);
        assert_eq!(f.chain.permit_nonce(f.dai, user.address()), 1);
    }

    #[test]
    fn permit_signed_by_other_holder_rejected() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let other = TestAccount::random();
        let deadline = f.chain.block_time() + Duration::hours(1);
        let sig = other.permit_for(f.dai, f.pool, 0, deadline);

        assert!(f
            .auth
            .admit_permit(&mut f.chain, user.address(), 30, 0, deadline, &sig)
            .is_err());
        assert_eq!(f.chain.balance_of(f.dai, f.pool), 0);
    }

    #[test]
    fn relayed_credits_signer() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        f.chain.approve(f.dai, user.address(), f.pool, 25).unwrap();
        let req = user.relayed_deposit(f.forwarder, f.pool, 0, 25);

        let admission = f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req)
            .unwrap();
        assert_eq!(f.auth.relay_nonces().next_nonce(user.address()), 0);
        let dep = f.auth.settle_relay(admission);
        assert_eq!(dep.depositor, user.address());
        assert_eq!(dep.path, AdmissionPath::Relayed);
        assert_eq!(f.auth.relay_nonces().next_nonce(user.address()), 1);
    }

    #[test]
    fn relayed_from_untrusted_sender_rejected() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        f.chain.approve(f.dai, user.address(), f.pool, 25).unwrap();
        let req = user.relayed_deposit(f.forwarder, f.pool, 0, 25);
        let stranger = Address::from_label("stranger");

        let err = f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, stranger, &req)
            .unwrap_err();
        assert!(matches!(err, BatchMintError::UntrustedForwarder(a) if a == stranger));
    }

    #[test]
    fn relayed_to_other_pool_rejected() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let req = user.relayed_deposit(f.forwarder, Address::from_label("other-pool"), 0, 25);
        let err = f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req)
            .unwrap_err();
        assert!(matches!(err, BatchMintError::RelayRecipientMismatch(_)));
    }

    #[test]
    fn relayed_replay_rejected() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        f.chain.approve(f.dai, user.address(), f.pool, 100).unwrap();
        let req = user.relayed_deposit(f.forwarder, f.pool, 0, 25);
        let admission = f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req)
            .unwrap();
        let _ = f.auth.settle_relay(admission);
        let err = f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req)
            .unwrap_err();
        assert!(matches!(err, BatchMintError::RelayNonceMismatch { .. }));
        assert_eq!(f.chain.balance_of(f.dai, f.pool), 25);
    }

    #[test]
    fn failed_relayed_pull_keeps_nonce() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let req = user.relayed_deposit(f.forwarder, f.pool, 0, 25);
        assert!(matches!(
            f.auth
                .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req),
            Err(BatchMintError::InsufficientAllowance { .. })
        ));
        assert_eq!(f.auth.relay_nonces().next_nonce(user.address()), 0);
    }

    #[test]
    fn relayed_permit_uses_signer_as_holder() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        let deadline = f.chain.block_time() + Duration::hours(1);
        let action = RelayedAction::PermitAndDeposit {
            amount: 30,
            nonce: 0,
            deadline,
            permit_signature: user.permit_for(f.dai, f.pool, 0, deadline),
        };
        let req = user.forward_request(f.forwarder, f.pool, 0, action);

        let dep = f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req)
            .unwrap()
            .deposit;
        assert_eq!(dep.depositor, user.address());
        assert_eq!(dep.path, AdmissionPath::RelayedPermit);
        assert_eq!(f.chain.balance_of(f.dai, f.pool), 30);
    }

    #[test]
    fn recovery_is_swappable() {
        let mut f = fixture();
        let user = funded(&mut f, 100);
        f.chain.approve(f.dai, user.address(), f.pool, 10).unwrap();
        let mut req = user.relayed_deposit(f.forwarder, f.pool, 0, 10);
        req.signature.clear();

        assert!(f
            .auth
            .admit_relayed(&mut f.chain, &Ed25519SignerRecovery, f.forwarder, &req)
            .is_err());
        let dep = f
            .auth
            .admit_relayed(&mut f.chain, &ForwarderAttestedRecovery, f.forwarder, &req)
            .unwrap()
            .deposit;
        assert_eq!(dep.depositor, user.address());
    }

    #[test]
    fn relayed_before_forwarder_init_rejected() {
        let mut chain = InMemoryChain::new();
        let dai = chain.deploy_token("DAI");
        let pool = Address::from_label("pool");
        let auth = Authorizer::new(pool, dai);
        let user = TestAccount::random();
        let fwd = Address::from_label("forwarder");
        let req = user.relayed_deposit(fwd, pool, 0, 10);
        assert!(matches!(
            auth.admit_relayed(&mut chain, &Ed25519SignerRecovery, fwd, &req),
            Err(BatchMintError::UntrustedForwarder(_))
        ));
    }
}
