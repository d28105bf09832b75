// src/hal/can.rs

use embedded_can::{nb::Can, Frame, Id, StandardId};

use crate::common::{CanFrame, CanId, Transceiver};

/// Largest software filter list.
const MAX_FILTER_IDS: usize = 8;

/// [`Transceiver`] over any `embedded-can` non-blocking controller.
///
/// Filtering is done in software: frames outside the accepted list, and all
/// extended or remote frames, are consumed and reported as `WouldBlock`.
/// Program the controller's hardware filter as well where it has one.
#[derive(Debug)]
pub struct CanAdapter<C> {
    can: C,
    accepted: heapless::Vec<CanId, MAX_FILTER_IDS>,
}

impl<C: Can> CanAdapter<C> {
    /// Accepts everything until [`Transceiver::set_filter`] is called.
    pub fn new(can: C) -> Self {
        CanAdapter {
            can,
            accepted: heapless::Vec::new(),
        }
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.can
    }

    pub fn release(self) -> C {
        self.can
    }

    fn accepts(&self, id: CanId) -> bool {
        self.accepted.is_empty() || self.accepted.contains(&id)
    }

    fn convert(&self, frame: &C::Frame) -> Option<CanFrame> {
        if frame.is_remote_frame() {
            return None;
        }
        let Id::Standard(sid) = frame.id() else {
            return None;
        };
        let id = CanId::new(sid.as_raw()).ok()?;
        if !self.accepts(id) {
            return None;
        }
        CanFrame::new(id, frame.data()).ok()
    }
}

impl<C: Can> Transceiver for CanAdapter<C> {
    type Error = C::Error;

    fn try_send(&mut self, frame: &CanFrame) -> nb::Result<(), Self::Error> {
        // `CanId` is always a valid 11-bit identifier and payloads never
        // exceed 8 bytes, so neither conversion can fail in practice.
        let Some(id) = StandardId::new(frame.id().as_raw()) else {
            return Err(nb::Error::WouldBlock);
        };
        let Some(out) = C::Frame::new(id, frame.payload()) else {
            return Err(nb::Error::WouldBlock);
        };
        match self.can.transmit(&out)? {
            None => Ok(()),
            Some(_displaced) => {
                // Lower-priority frame pushed out of its mailbox.
                debug!("frame displaced by {}", frame.id());
                Ok(())
            }
        }
    }

    fn try_receive(&mut self) -> nb::Result<CanFrame, Self::Error> {
        let frame = self.can.receive()?;
        match self.convert(&frame) {
            Some(frame) => Ok(frame),
            None => {
                trace!("filtered inbound frame");
                Err(nb::Error::WouldBlock)
            }
        }
    }

    fn set_filter(&mut self, accepted: &[CanId]) -> Result<(), Self::Error> {
        self.accepted.clear();
        for id in accepted {
            if self.accepted.push(*id).is_err() {
                // Overflow falls back to accepting everything.
                warn!("filter list full, accepting all identifiers");
                self.accepted.clear();
                break;
            }
        }
        Ok(())
    }
}
