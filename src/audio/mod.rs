//! Audio input layer
//!
//! Sniffs the container from magic bytes and decodes it to the 16-bit WAV
//! the stretch tool consumes. Decoding is powered by symphonia.

mod decode;
mod sniff;

pub use decode::{decode_to_wav, DecodedAudio};
pub use sniff::{classify_header, sniff_file, ContainerFormat, ID3V23_MAGIC, OGG_MAGIC};
