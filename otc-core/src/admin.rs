//! Authorization gate for code issuance.
//!
//! Issuance is privileged; verification is not. The gate works on a
//! *claimed* identity string (in practice an email forwarded by the HTTP
//! layer) and trusts that whatever sits in front of the service has
//! authenticated it.

/// Decides whether a claimed identity may request code issuance.
///
/// The contract is a single boolean over an optional claim, so the policy
/// behind it can grow (several admins, a role lookup) without touching the
/// enforcement points that call it.
pub trait AdminPolicy: Send + Sync {
    /// `true` iff the claim identifies an administrator. An absent claim is
    /// never an administrator.
    fn is_admin(&self, claimed_email: Option<&str>) -> bool;
}

/// The whole policy today: one configured administrator email, compared
/// byte-for-byte. No case folding or trimming; `Admin@x` and `admin@x`
/// are different identities to this gate.
#[derive(Clone, Debug)]
pub struct SingleAdmin {
    email: String,
}

impl SingleAdmin {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl AdminPolicy for SingleAdmin {
    fn is_admin(&self, claimed_email: Option<&str>) -> bool {
        claimed_email == Some(self.email.as_str())
    }
}
