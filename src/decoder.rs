//! Sum-product (belief propagation) LDPC decoder.
//!
//! Runs the flooding message-passing schedule: every check node updates all
//! of its outgoing messages from the current variable messages, then every
//! variable node updates all of its outgoing messages from the current check
//! messages, repeated until the hard decision on the accumulated LLRs
//! satisfies every parity check or `max_iterations` is reached.

use crate::channel::intrinsic_llrs;
use crate::phi::phi;
use crate::sparse::SPMatrix;

/// Outcome of a decode attempt: the recovered length-`k` message (or the
/// best estimate available, on failure) and the number of iterations used.
///
/// Replaces the older convention of signaling a failed decode with a
/// message vector of `NaN`s: callers now match on [`Result::Ok`]/
/// [`Result::Err`] instead of scanning the output for `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderOutput {
    /// Hard decision on the first `k` positions of the final LLRs, i.e. the
    /// recovered message bits.
    pub message: Vec<u8>,
    /// Number of check/variable-node update rounds performed. `0` means the
    /// channel output already satisfied every parity check before any
    /// message passing was needed.
    pub iterations: usize,
}

/// Converts a decode [`Result`] into the legacy convention of a message
/// vector that is all `NaN` on failure, for callers that still expect that
/// sentinel (e.g. externally persisted CSV columns with a fixed schema).
pub fn as_nan_vector(result: &Result<DecoderOutput, DecoderOutput>) -> Vec<f64> {
    match result {
        Ok(out) => out.message.iter().map(|&b| b as f64).collect(),
        Err(out) => vec![f64::NAN; out.message.len()],
    }
}

/// LDPC belief propagation decoder for a fixed parity-check matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder {
    h: SPMatrix,
    message_len: usize,
    input_llrs: Box<[f64]>,
    output_llrs: Box<[f64]>,
    check_messages: Messages,
    variable_messages: Messages,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
struct Message {
    source: usize,
    value: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Messages {
    per_destination: Box<[Box<[Message]>]>,
}

impl Messages {
    fn from_adjacency<'a>(iter: impl Iterator<Item = impl Iterator<Item = &'a usize>>) -> Messages {
        Messages {
            per_destination: iter
                .map(|sources| {
                    sources
                        .map(|&source| Message { source, value: 0.0 })
                        .collect::<Vec<_>>()
                        .into_boxed_slice()
                })
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    fn send(&mut self, source: usize, destination: usize, value: f64) {
        let message = self.per_destination[destination]
            .iter_mut()
            .find(|m| m.source == source)
            .expect("message for source not found");
        message.value = value;
    }
}

impl Decoder {
    /// Builds a decoder for the parity-check matrix `h`, of shape
    /// `(n-k) x n`.
    pub fn new(h: SPMatrix) -> Decoder {
        let message_len = h.num_cols() - h.num_rows();
        let input_llrs = vec![0.0; h.num_cols()].into_boxed_slice();
        let output_llrs = input_llrs.clone();
        let check_messages = Messages::from_adjacency((0..h.num_cols()).map(|c| h.iter_col(c)));
        let variable_messages = Messages::from_adjacency((0..h.num_rows()).map(|r| h.iter_row(r)));
        Decoder {
            h,
            message_len,
            input_llrs,
            output_llrs,
            check_messages,
            variable_messages,
        }
    }

    /// Decodes a received vector of real channel symbols `r`, under AWGN
    /// with standard deviation `sigma`.
    ///
    /// On success, returns `Ok(DecoderOutput)` with the recovered message
    /// and the iteration count at which the parity checks first cleared. On
    /// failure (parity checks still unsatisfied after `max_iterations`
    /// rounds), returns `Err(DecoderOutput)` carrying the last hard decision
    /// and `max_iterations`. The first parity test happens only after the
    /// first check/variable-node update round; there is no pre-iteration
    /// short circuit.
    ///
    /// # Panics
    /// Panics if `r.len()` does not match the number of columns of `h`.
    pub fn decode(
        &mut self,
        r: &[f64],
        sigma: f64,
        max_iterations: usize,
    ) -> Result<DecoderOutput, DecoderOutput> {
        let llrs = intrinsic_llrs(r, sigma);
        assert_eq!(llrs.len(), self.input_llrs.len());

        self.initialize(&llrs);
        let mut last_decision = Self::hard_decision(&llrs);
        for iteration in 1..=max_iterations {
            self.process_check_nodes();
            self.process_variable_nodes();
            last_decision = Self::hard_decision(&self.output_llrs);
            if self.satisfies_parity(&self.output_llrs) {
                return Ok(DecoderOutput {
                    message: self.truncate_to_message(&last_decision),
                    iterations: iteration,
                });
            }
        }

        Err(DecoderOutput {
            message: self.truncate_to_message(&last_decision),
            iterations: max_iterations,
        })
    }

    fn truncate_to_message(&self, codeword: &[u8]) -> Vec<u8> {
        codeword[..self.message_len].to_vec()
    }

    fn initialize(&mut self, llrs: &[f64]) {
        self.input_llrs.copy_from_slice(llrs);
        for (v, &llr) in self.input_llrs.iter().enumerate() {
            for &c in self.h.iter_col(v) {
                self.variable_messages.send(v, c, llr);
            }
        }
    }

    fn process_check_nodes(&mut self) {
        for (c, messages) in self.variable_messages.per_destination.iter().enumerate() {
            for (dest, value) in Self::new_check_messages(messages) {
                self.check_messages.send(c, dest, value);
            }
        }
    }

    fn new_check_messages(var_messages: &[Message]) -> impl Iterator<Item = (usize, f64)> + '_ {
        let mut sign: u32 = 0;
        let mut sum = 0.0;
        let mut phis = Vec::with_capacity(var_messages.len());
        for msg in var_messages.iter() {
            let phi_x = phi(msg.value.abs());
            sum += phi_x;
            phis.push(phi_x);
            if msg.value < 0.0 {
                sign ^= 1;
            }
        }

        var_messages
            .iter()
            .zip(phis.into_iter())
            .map(move |(msg, phi_x)| {
                let y = phi(sum - phi_x);
                let s = if msg.value < 0.0 { sign ^ 1 } else { sign };
                let value = if s == 0 { y } else { -y };
                (msg.source, value)
            })
    }

    fn process_variable_nodes(&mut self) {
        for (((v, messages), output_llr), &input_llr) in self
            .check_messages
            .per_destination
            .iter()
            .enumerate()
            .zip(self.output_llrs.iter_mut())
            .zip(self.input_llrs.iter())
        {
            let (new_llr, new_messages) = Self::new_variable_messages(input_llr, messages);
            *output_llr = new_llr;
            for (dest, value) in new_messages {
                self.variable_messages.send(v, dest, value);
            }
        }
    }

    fn new_variable_messages(
        input_llr: f64,
        chk_messages: &[Message],
    ) -> (f64, impl Iterator<Item = (usize, f64)> + '_) {
        let llr = input_llr + chk_messages.iter().map(|m| m.value).sum::<f64>();
        let new_messages = chk_messages.iter().map(move |m| (m.source, llr - m.value));
        (llr, new_messages)
    }

    fn satisfies_parity(&self, llrs: &[f64]) -> bool {
        !(0..self.h.num_rows()).any(|r| {
            self.h.iter_row(r).filter(|&&c| llrs[c] < 0.0).count() % 2 == 1
        })
    }

    fn hard_decision(llrs: &[f64]) -> Vec<u8> {
        llrs.iter().map(|&llr| if llr < 0.0 { 1 } else { 0 }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn johnson_decoder() -> Decoder {
        // Example 2.5 in Sarah J. Johnson - Iterative Error Correction.
        let dense = vec![
            vec![1u8, 1, 0, 1, 0, 0],
            vec![0, 1, 1, 0, 1, 0],
            vec![1, 0, 0, 0, 1, 1],
            vec![0, 0, 1, 1, 0, 1],
        ];
        Decoder::new(SPMatrix::from_dense(&dense).unwrap())
    }

    // Bit 0 maps to symbol +1 (matching `crate::channel`'s convention), so
    // with sigma = 1 the intrinsic LLR is +2 for a 0 and -2 for a 1.
    fn to_symbols(bits: &[u8]) -> Vec<f64> {
        bits.iter().map(|&b| if b == 0 { 1.0 } else { -1.0 }).collect()
    }

    #[test]
    fn zero_noise_identity_takes_one_iteration() {
        let mut decoder = johnson_decoder();
        let codeword = [0u8, 0, 1, 0, 1, 1];
        let out = decoder.decode(&to_symbols(&codeword), 1.0, 100).unwrap();
        assert_eq!(out.message, &codeword[..2]);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn single_bit_error_corrected_in_one_iteration() {
        let good = [0u8, 0, 1, 0, 1, 1];
        for j in 0..good.len() {
            let mut decoder = johnson_decoder();
            let mut bad = good;
            bad[j] ^= 1;
            let out = decoder.decode(&to_symbols(&bad), 1.0, 100).unwrap();
            assert_eq!(out.message, &good[..2], "flipped bit {j}");
            assert_eq!(out.iterations, 1);
        }
    }

    #[test]
    fn zero_iteration_budget_fails_on_unsatisfied_input() {
        let mut decoder = johnson_decoder();
        // All-ones is not a codeword of this H; with a zero iteration budget
        // the decoder cannot attempt a single check/variable-node update
        // round, so it must report failure on the raw hard decision.
        let symbols = to_symbols(&[1u8, 1, 1, 1, 1, 1]);
        let out = decoder.decode(&symbols, 1.0, 0);
        assert!(out.is_err());
        assert_eq!(out.unwrap_err().iterations, 0);
    }

    #[test]
    fn as_nan_vector_matches_legacy_convention() {
        let mut decoder = johnson_decoder();
        let codeword = [0u8, 0, 1, 0, 1, 1];
        let result = decoder.decode(&to_symbols(&codeword), 1.0, 100);
        let v = as_nan_vector(&result);
        assert_eq!(v, vec![0.0, 0.0]);

        let mut failing_decoder = johnson_decoder();
        let symbols = to_symbols(&[1u8, 1, 1, 1, 1, 1]);
        let failed = failing_decoder.decode(&symbols, 1.0, 0);
        let v = as_nan_vector(&failed);
        assert!(v.iter().all(|x| x.is_nan()));
    }
}
