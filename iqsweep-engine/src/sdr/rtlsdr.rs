//! RTL2832U dongles through librtlsdr.

use iqsweep_messages::{GainMode, Hertz};
use log::{debug, info};
use num_complex::Complex;

use super::IqDevice;
use crate::error::DeviceError;

/// USB bulk transfers must be a multiple of this many bytes.
const USB_PACKET: usize = 512;

/// An open RTL-SDR receiver.
pub struct RtlSdrDevice {
    device: Option<rtlsdr::RTLSDRDevice>,
    index: u32,
}

impl std::fmt::Debug for RtlSdrDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtlSdrDevice")
            .field("index", &self.index)
            .field("open", &self.device.is_some())
            .finish()
    }
}

impl RtlSdrDevice {
    pub fn open(index: u32) -> Result<Self, DeviceError> {
        let device_index = i32::try_from(index)
            .map_err(|_| DeviceError::new("open RTL-SDR", format!("bad device index {index}")))?;
        let mut device = rtlsdr::open(device_index)
            .map_err(|e| DeviceError::new("open RTL-SDR", format!("device {index}: {e}")))?;
        device
            .reset_buffer()
            .map_err(|e| DeviceError::new("reset buffer", e.to_string()))?;
        info!("Opened RTL-SDR device {index}");
        Ok(Self {
            device: Some(device),
            index,
        })
    }

    fn device(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut rtlsdr::RTLSDRDevice, DeviceError> {
        self.device
            .as_mut()
            .ok_or_else(|| DeviceError::new(operation, "device is closed"))
    }
}

fn to_u32(operation: &'static str, value: Hertz) -> Result<u32, DeviceError> {
    let hz = value.as_hz().round();
    if hz >= 0.0 && hz <= f64::from(u32::MAX) {
        Ok(hz as u32)
    } else {
        Err(DeviceError::new(operation, format!("{value} out of range")))
    }
}

impl IqDevice for RtlSdrDevice {
    fn set_sample_rate(&mut self, rate: Hertz) -> Result<(), DeviceError> {
        let rate_hz = to_u32("set sample rate", rate)?;
        self.device("set sample rate")?
            .set_sample_rate(rate_hz)
            .map_err(|e| DeviceError::new("set sample rate", e.to_string()))
    }

    fn set_gain(&mut self, gain: GainMode) -> Result<(), DeviceError> {
        let device = self.device("set gain")?;
        match gain {
            // false = automatic
            GainMode::Auto => device
                .set_tuner_gain_mode(false)
                .map_err(|e| DeviceError::new("set gain mode", e.to_string())),
            GainMode::Manual(db) => {
                device
                    .set_tuner_gain_mode(true)
                    .map_err(|e| DeviceError::new("set gain mode", e.to_string()))?;
                // librtlsdr takes tenths of a dB
                let tenths = (db * 10.0).round() as i32;
                device
                    .set_tuner_gain(tenths)
                    .map_err(|e| DeviceError::new("set gain", e.to_string()))
            }
        }
    }

    fn set_center_frequency(&mut self, freq: Hertz) -> Result<(), DeviceError> {
        let freq_hz = to_u32("set center frequency", freq)?;
        self.device("set center frequency")?
            .set_center_freq(freq_hz)
            .map_err(|e| DeviceError::new("set center frequency", e.to_string()))
    }

    fn read_samples(&mut self, count: usize) -> Result<Vec<Complex<f32>>, DeviceError> {
        let bytes = (count * 2).div_ceil(USB_PACKET) * USB_PACKET;
        let buf = self
            .device("read samples")?
            .read_sync(bytes)
            .map_err(|e| DeviceError::new("read samples", e.to_string()))?;
        if buf.len() < count * 2 {
            return Err(DeviceError::new(
                "read samples",
                format!("short read: {} of {} bytes", buf.len(), count * 2),
            ));
        }
        debug!("RTL-SDR read {} bytes", buf.len());

        // Interleaved u8 I, Q centered on 127.5
        Ok(buf[..count * 2]
            .chunks_exact(2)
            .map(|iq| {
                Complex::new(
                    (f32::from(iq[0]) - 127.5) / 127.5,
                    (f32::from(iq[1]) - 127.5) / 127.5,
                )
            })
            .collect())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        let mut device = self
            .device
            .take()
            .ok_or_else(|| DeviceError::new("close", "device is already closed"))?;
        device
            .close()
            .map_err(|e| DeviceError::new("close", e.to_string()))?;
        info!("Closed RTL-SDR device {}", self.index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_conversion() {
        assert_eq!(to_u32("tune", Hertz::mhz(1202.56)).unwrap(), 1_202_560_000);
        assert!(to_u32("tune", Hertz(-1.0)).is_err());
        assert!(to_u32("tune", Hertz(5e9)).is_err());
    }
}
