use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::Result;

const FMT_CHUNK_LEN: u32 = 16;
const PCM_FORMAT: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = 2;

/// Serializes the samples as an uncompressed mono 16-bit PCM RIFF/WAVE
/// stream. Chunk sizes are computed up front, so the sink never needs to
/// seek.
pub fn encode<W: Write>(sink: &mut W, samples: &[f64], sample_rate: u32) -> Result<()> {
    let data_size = samples.len() as u32 * BYTES_PER_SAMPLE;
    let byte_rate = sample_rate * BYTES_PER_SAMPLE;
    let block_align = (BITS_PER_SAMPLE / 8) * CHANNELS;

    sink.write_all(b"RIFF")?;
    sink.write_u32::<LittleEndian>(36 + data_size)?;
    sink.write_all(b"WAVE")?;

    sink.write_all(b"fmt ")?;
    sink.write_u32::<LittleEndian>(FMT_CHUNK_LEN)?;
    sink.write_u16::<LittleEndian>(PCM_FORMAT)?;
    sink.write_u16::<LittleEndian>(CHANNELS)?;
    sink.write_u32::<LittleEndian>(sample_rate)?;
    sink.write_u32::<LittleEndian>(byte_rate)?;
    sink.write_u16::<LittleEndian>(block_align)?;
    sink.write_u16::<LittleEndian>(BITS_PER_SAMPLE)?;

    sink.write_all(b"data")?;
    sink.write_u32::<LittleEndian>(data_size)?;
    for &sample in samples {
        sink.write_i16::<LittleEndian>(quantize(sample))?;
    }

    Ok(())
}

/// Encodes into an owned byte buffer, the form the CLI front end consumes.
pub fn encode_to_vec(samples: &[f64], sample_rate: u32) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(44 + samples.len() * BYTES_PER_SAMPLE as usize);
    encode(&mut bytes, samples, sample_rate)?;
    Ok(bytes)
}

/// Clamps to [-1.0, 1.0], scales by 32767 and truncates toward zero.
fn quantize(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * f64::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_maps_full_scale_and_truncates_toward_zero() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 32_767);
        assert_eq!(quantize(-1.0), -32_767);
        assert_eq!(quantize(0.5), 16_383); // 16383.5 truncated
        assert_eq!(quantize(-0.5), -16_383);
    }

    #[test]
    fn quantize_clamps_out_of_range_samples() {
        assert_eq!(quantize(2.0), 32_767);
        assert_eq!(quantize(-2.0), -32_767);
    }

    #[test]
    fn file_size_is_header_plus_two_bytes_per_sample() {
        let samples = vec![0.0; 1_000];
        let bytes = encode_to_vec(&samples, 44_100).unwrap();
        assert_eq!(bytes.len(), 44 + 2 * samples.len());

        let data_size = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
        assert_eq!(data_size, 2_000);
        let riff_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(riff_size, 36 + data_size);
    }

    #[test]
    fn header_layout_is_bit_exact() {
        let bytes = encode_to_vec(&[0.0, 0.0, 0.0], 44_100).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(
            u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            16
        );
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1); // PCM
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1); // mono
        assert_eq!(
            u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            44_100
        );
        assert_eq!(
            u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
            88_200
        );
        assert_eq!(u16::from_le_bytes([bytes[32], bytes[33]]), 2); // block align
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16); // bit depth
        assert_eq!(&bytes[36..40], b"data");
    }

    #[test]
    fn samples_are_little_endian_after_the_header() {
        let bytes = encode_to_vec(&[1.0, -1.0, 0.0], 44_100).unwrap();
        assert_eq!(i16::from_le_bytes([bytes[44], bytes[45]]), 32_767);
        assert_eq!(i16::from_le_bytes([bytes[46], bytes[47]]), -32_767);
        assert_eq!(i16::from_le_bytes([bytes[48], bytes[49]]), 0);
    }

    #[test]
    fn empty_buffer_encodes_to_header_only() {
        let bytes = encode_to_vec(&[], 44_100).unwrap();
        assert_eq!(bytes.len(), 44);
        let data_size = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
        assert_eq!(data_size, 0);
    }
}
