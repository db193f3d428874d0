//! # ldpc-wimax
//!
//! Encoding and sum-product decoding of IEEE 802.16e-style structured LDPC
//! codes: a protograph expander lifts a compact base matrix into a full
//! parity-check matrix, a systematic encoder is derived from it by Gaussian
//! elimination over GF(2), and a flooding-schedule sum-product decoder
//! recovers messages transmitted over a BPSK/AWGN channel.

pub mod channel;
pub mod cli;
pub mod decoder;
pub mod encoder;
pub mod expander;
pub mod gf2;
pub mod phi;
pub mod rand;
pub mod simulation;
pub mod sparse;
pub mod tables;
