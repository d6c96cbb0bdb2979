use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use iqsweep_messages::{GainMode, Hertz};
use log::debug;
use num_complex::Complex;

use super::IqDevice;
use crate::error::DeviceError;

const BYTES_PER_SAMPLE: usize = 2 * std::mem::size_of::<f32>();

/// Replays a recording of interleaved little-endian f32 I/Q pairs.
///
/// Tuning is accepted but has no effect on the data, so every step of a
/// sweep sees the same signal.
#[derive(Debug)]
pub struct FileDevice {
    reader: Option<BufReader<File>>,
    loop_on_eof: bool,
}

impl FileDevice {
    /// Open a recording. If `loop_on_eof` is true, reads restart from the
    /// beginning of the file when it runs out.
    pub fn open<P: AsRef<Path>>(path: P, loop_on_eof: bool) -> Result<Self, DeviceError> {
        let file = File::open(path).map_err(|e| DeviceError::io("open IQ file", &e))?;
        Ok(Self {
            reader: Some(BufReader::new(file)),
            loop_on_eof,
        })
    }

    /// Fill as much of `buf` as the file allows. Returns the number of
    /// samples read; 0 means EOF without looping.
    fn read_into(
        reader: &mut BufReader<File>,
        loop_on_eof: bool,
        buf: &mut [Complex<f32>],
    ) -> io::Result<usize> {
        let bytes_needed = buf.len() * BYTES_PER_SAMPLE;
        let mut byte_buf = vec![0u8; bytes_needed];
        let mut total_read = 0;
        let mut rewound = false;

        while total_read < bytes_needed {
            match reader.read(&mut byte_buf[total_read..]) {
                Ok(0) => {
                    // A rewind that yields nothing means the file is empty
                    if loop_on_eof && total_read == 0 && !rewound {
                        reader.seek(SeekFrom::Start(0))?;
                        rewound = true;
                        continue;
                    }
                    break;
                }
                Ok(n) => {
                    total_read += n;
                    rewound = false;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let samples_read = total_read / BYTES_PER_SAMPLE;
        for (sample, chunk) in buf
            .iter_mut()
            .zip(byte_buf[..samples_read * BYTES_PER_SAMPLE].chunks_exact(BYTES_PER_SAMPLE))
        {
            let i_val = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let q_val = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            *sample = Complex::new(i_val, q_val);
        }

        // Drop any trailing half sample so the next read starts aligned
        let leftover = total_read % BYTES_PER_SAMPLE;
        if leftover != 0 {
            reader.seek(SeekFrom::Current(-(leftover as i64)))?;
        }

        Ok(samples_read)
    }

    fn reader(&mut self, operation: &'static str) -> Result<&mut BufReader<File>, DeviceError> {
        self.reader
            .as_mut()
            .ok_or_else(|| DeviceError::new(operation, "device is closed"))
    }
}

impl IqDevice for FileDevice {
    fn set_sample_rate(&mut self, rate: Hertz) -> Result<(), DeviceError> {
        self.reader("set sample rate")?;
        debug!("File source ignores sample rate {rate}");
        Ok(())
    }

    fn set_gain(&mut self, _gain: GainMode) -> Result<(), DeviceError> {
        self.reader("set gain")?;
        Ok(())
    }

    fn set_center_frequency(&mut self, freq: Hertz) -> Result<(), DeviceError> {
        self.reader("set center frequency")?;
        debug!("File source tuned to {freq}, replaying the same recording");
        Ok(())
    }

    fn read_samples(&mut self, count: usize) -> Result<Vec<Complex<f32>>, DeviceError> {
        let loop_on_eof = self.loop_on_eof;
        let reader = self.reader("read samples")?;
        let mut samples = vec![Complex::new(0.0, 0.0); count];
        let mut filled = 0;
        while filled < count {
            let n = Self::read_into(reader, loop_on_eof, &mut samples[filled..])
                .map_err(|e| DeviceError::io("read samples", &e))?;
            if n == 0 {
                return Err(DeviceError::new(
                    "read samples",
                    format!("IQ file ended after {filled} of {count} samples"),
                ));
            }
            filled += n;
        }
        Ok(samples)
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        self.reader
            .take()
            .map(drop)
            .ok_or_else(|| DeviceError::new("close", "device is already closed"))
    }
}
