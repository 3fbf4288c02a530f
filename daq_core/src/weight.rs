use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

/// One strain-gauge bridge behind a 24-bit amplifier, driven over two
/// control lines (data out, serial clock). The four balance channels on
/// the rig are four instances of this type so tare and failure policy
/// stay uniform.
pub struct WeightChannel<Dout, Sck> {
    dout: Dout,
    sck: Sck,
    offset: i32,
    scale: f32,
}

impl<Dout: InputPin, Sck: OutputPin> WeightChannel<Dout, Sck> {
    /// A 10 SPS amplifier takes up to ~100 ms between conversions; the
    /// tare ready-wait gives up after this many milliseconds.
    const MAX_READY_WAIT_MS: u16 = 150;

    /// Bind the channel to its two control lines. Must be called once
    /// before any other operation. Hardware-level failures are not
    /// observable at this layer, so binding always succeeds.
    pub fn new(dout: Dout, sck: Sck, scale: f32) -> Self {
        Self {
            dout,
            sck,
            offset: 0,
            scale,
        }
    }

    /// Non-blocking poll of whether a fresh conversion is available.
    /// The amplifier holds the data line low while a frame is ready.
    /// A line fault reads as not-ready.
    pub fn is_ready(&self) -> bool {
        matches!(self.dout.is_low(), Ok(true))
    }

    /// Capture the current bridge output as the zero-force reference,
    /// averaging up to `samples` ready conversions. Overwrites any
    /// previous reference. If the bridge never becomes ready the
    /// previous reference is kept.
    pub fn tare<D: DelayMs<u16>>(&mut self, delay: &mut D, samples: u8) {
        let mut sum: i64 = 0;
        let mut taken: i64 = 0;

        for _ in 0..samples {
            if !self.wait_ready(delay) {
                break;
            }
            match self.read_raw() {
                Some(raw) => {
                    sum += raw as i64;
                    taken += 1;
                }
                None => break,
            }
        }

        if taken > 0 {
            self.offset = (sum / taken) as i32;
        }
    }

    /// Calibrated force reading relative to the tare reference.
    /// Caller contract: only call when `is_ready` reports true and
    /// substitute 0.0 for the cycle otherwise; the frame is stale or
    /// undefined while a conversion is still running.
    /// Returns `None` on a line fault.
    pub fn read_units(&mut self) -> Option<f32> {
        let raw = self.read_raw()?;
        Some((raw - self.offset) as f32 / self.scale)
    }

    /// Replace the calibration scale (counts per output unit).
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Get the zero-force reference captured by the last tare.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    fn wait_ready<D: DelayMs<u16>>(&self, delay: &mut D) -> bool {
        for _ in 0..Self::MAX_READY_WAIT_MS {
            if self.is_ready() {
                return true;
            }
            delay.delay_ms(1);
        }
        false
    }

    /// Shift one 24-bit two's-complement frame out of the amplifier.
    /// A clock pulse held high for more than 60 us powers the part down,
    /// so the line is toggled without intermediate delays.
    fn read_raw(&mut self) -> Option<i32> {
        let mut frame: u32 = 0;

        for _ in 0..24 {
            self.sck.set_high().ok()?;
            frame <<= 1;
            if self.dout.is_high().ok()? {
                frame |= 1;
            }
            self.sck.set_low().ok()?;
        }

        // One extra pulse keeps the amplifier on channel A, gain 128,
        // for the next conversion.
        self.sck.set_high().ok()?;
        self.sck.set_low().ok()?;

        if frame & 0x0080_0000 != 0 {
            frame |= 0xFF00_0000;
        }
        Some(frame as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use std::rc::Rc;

    /// Behavioral model of the bridge amplifier's serial interface:
    /// data line low when ready, frame bits shifted MSB-first on clock
    /// pulses, 25th pulse ends the frame.
    struct BridgeState {
        counts: i32,
        ready: bool,
        pulse: u8,
        bit: bool,
        in_frame: bool,
    }

    impl BridgeState {
        fn new(counts: i32) -> Self {
            Self {
                counts,
                ready: true,
                pulse: 0,
                bit: false,
                in_frame: false,
            }
        }

        fn clock_high(&mut self) {
            self.in_frame = true;
            if self.pulse < 24 {
                let frame = (self.counts as u32) & 0x00FF_FFFF;
                self.bit = frame >> (23 - self.pulse) & 1 == 1;
            }
        }

        fn clock_low(&mut self) {
            self.pulse += 1;
            if self.pulse >= 25 {
                self.pulse = 0;
                self.in_frame = false;
            }
        }

        fn data_is_high(&self) -> bool {
            if self.in_frame {
                self.bit
            } else {
                !self.ready
            }
        }
    }

    struct BridgeData(Rc<RefCell<BridgeState>>);
    struct BridgeClock(Rc<RefCell<BridgeState>>);

    impl InputPin for BridgeData {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Self::Error> {
            Ok(self.0.borrow().data_is_high())
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            Ok(!self.0.borrow().data_is_high())
        }
    }

    impl OutputPin for BridgeClock {
        type Error = Infallible;

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().clock_high();
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().clock_low();
            Ok(())
        }
    }

    struct NoopDelay;

    impl DelayMs<u16> for NoopDelay {
        fn delay_ms(&mut self, _ms: u16) {}
    }

    fn bridge_channel(
        counts: i32,
    ) -> (
        Rc<RefCell<BridgeState>>,
        WeightChannel<BridgeData, BridgeClock>,
    ) {
        let state = Rc::new(RefCell::new(BridgeState::new(counts)));
        let channel = WeightChannel::new(
            BridgeData(state.clone()),
            BridgeClock(state.clone()),
            1.0,
        );
        (state, channel)
    }

    #[test]
    fn test_is_ready_follows_data_line() {
        let (state, channel) = bridge_channel(0);
        assert!(channel.is_ready());

        state.borrow_mut().ready = false;
        assert!(!channel.is_ready());
    }

    #[test]
    fn test_read_raw_positive_frame() {
        let (_state, mut channel) = bridge_channel(4093);
        assert_eq!(channel.read_raw(), Some(4093));
    }

    #[test]
    fn test_read_raw_sign_extends_negative_frame() {
        let (_state, mut channel) = bridge_channel(-5);
        assert_eq!(channel.read_raw(), Some(-5));
    }

    #[test]
    fn test_tare_zeroes_subsequent_readings() {
        let (state, mut channel) = bridge_channel(1000);
        channel.tare(&mut NoopDelay, 10);
        assert_eq!(channel.offset(), 1000);

        state.borrow_mut().counts = 1500;
        let units = channel.read_units().expect("Failed to read units.");
        assert_eq!(units, 500f32);
    }

    #[test]
    fn test_tare_keeps_reference_when_never_ready() {
        let (state, mut channel) = bridge_channel(1000);
        state.borrow_mut().ready = false;

        channel.tare(&mut NoopDelay, 10);
        assert_eq!(channel.offset(), 0);
    }

    #[test]
    fn test_scale_divides_counts() {
        let (state, mut channel) = bridge_channel(0);
        channel.tare(&mut NoopDelay, 3);
        channel.set_scale(2280f32);

        state.borrow_mut().counts = 2280;
        let units = channel.read_units().expect("Failed to read units.");
        assert_eq!(units, 1f32);
    }
}
