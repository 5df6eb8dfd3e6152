//! Card gateway abstraction
//!
//! A gateway is the boundary to whatever actually talks to the card, usually
//! an external LPA command-line tool. The tool reads the ISD-R AID to use
//! from a single setting, so probing a candidate AID means temporarily
//! overriding that setting. [`AidOverride`] scopes the override and puts
//! the previous value back when it is dropped, including during unwinding.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde_json::Value;
use tracing::trace;

/// Operations the AID subsystem needs from the card-access layer
pub trait CardGateway {
    /// Error type returned by card operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// AID the gateway currently uses for card operations
    fn aid(&self) -> &str;

    /// Change the AID used for subsequent card operations
    fn set_aid(&mut self, aid: &str);

    /// Enumerate installed profiles (lightweight)
    fn list_profiles(&mut self) -> Result<Value, Self::Error>;

    /// Read the full chip information (heavier, also works on plain UICCs)
    fn read_chip_info(&mut self) -> Result<Value, Self::Error>;
}

/// Scoped override of a gateway's AID
///
/// The prior AID is restored when the guard goes out of scope.
pub struct AidOverride<'a, G: CardGateway + ?Sized> {
    gateway: &'a mut G,
    previous: String,
}

impl<'a, G: CardGateway + ?Sized> AidOverride<'a, G> {
    /// Switch `gateway` to `aid` until the returned guard is dropped
    pub fn new(gateway: &'a mut G, aid: &str) -> Self {
        let previous = gateway.aid().to_string();
        trace!(%previous, %aid, "Overriding gateway AID");
        gateway.set_aid(aid);
        Self { gateway, previous }
    }

    /// AID that will be restored
    pub fn previous(&self) -> &str {
        &self.previous
    }
}

impl<G: CardGateway + ?Sized> Deref for AidOverride<'_, G> {
    type Target = G;

    fn deref(&self) -> &Self::Target {
        &*self.gateway
    }
}

impl<G: CardGateway + ?Sized> DerefMut for AidOverride<'_, G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.gateway
    }
}

impl<G: CardGateway + ?Sized> Drop for AidOverride<'_, G> {
    fn drop(&mut self) {
        trace!(previous = %self.previous, "Restoring gateway AID");
        self.gateway.set_aid(&self.previous);
    }
}

impl<G: CardGateway + ?Sized> fmt::Debug for AidOverride<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AidOverride")
            .field("aid", &self.gateway.aid())
            .field("previous", &self.previous)
            .finish()
    }
}

#[cfg(test)]
pub(crate) use mock::{MockError, MockGateway};
