//! Request identity set by the authentication layer in front of the service.

use uuid::Uuid;

/// The signed-in user for the current request.
///
/// Session handling lives outside this crate. Whatever authenticates the
/// request inserts this as a request extension; handlers read it as
/// `Option<Extension<CurrentUser>>` and treat its absence as anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);
