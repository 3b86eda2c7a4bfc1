/// Phase of a session navigation.
///
/// A successful call always ends in `Done`. When a call fails, the session
/// keeps the phase in which the error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// No navigation has run yet.
    #[default]
    Idle,

    /// Sending a hop of the redirect chain.
    Sending,

    /// The chain ended without `Location`; the body is being inspected.
    BodyReady,

    /// The logout indicator matched; posting the login form.
    LoggingIn,

    /// Replaying the original request after a login.
    Refetching,

    /// The navigation returned a body.
    Done,
}
