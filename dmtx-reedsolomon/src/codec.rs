use crate::{GfTables, Result, RsError, FCR, NN, PRIM};

const A0: u16 = NN; // index-form sentinel for log(0), following libfec

/// A Reed-Solomon code over GF(256) fixed to `nroots` parity symbols.
///
/// Holds the generator polynomial (in index form, for fast encoding); the
/// field log/antilog tables live separately in [`GfTables`] since they don't
/// depend on `nroots` and are shared across every block size a symbol uses.
#[derive(Debug, Clone)]
pub struct RsBlock {
    nroots: usize,
    genpoly: Vec<u8>,
    iprim: u16,
}

impl RsBlock {
    /// Builds the generator polynomial for `nroots` parity symbols.
    ///
    /// `nroots` must be in `1..255`.
    pub fn new(gf: &GfTables, nroots: usize) -> Result<Self> {
        if nroots == 0 || nroots >= NN as usize {
            return Err(RsError::InvalidRootCount);
        }

        let mut genpoly = vec![0u8; nroots + 1];
        genpoly[0] = 1;

        let mut root = FCR * PRIM;
        for i in 0..nroots {
            genpoly[i + 1] = 1;
            for j in (1..=i).rev() {
                if genpoly[j] != 0 {
                    let shifted = gf.alpha_to(gf.modnn(gf.index_of(genpoly[j]) as i32 + root as i32));
                    genpoly[j] = genpoly[j - 1] ^ shifted;
                } else {
                    genpoly[j] = genpoly[j - 1];
                }
            }
            genpoly[0] = gf.alpha_to(gf.modnn(gf.index_of(genpoly[0]) as i32 + root as i32));
            root += PRIM;
        }

        for coeff in genpoly.iter_mut() {
            *coeff = gf.index_of(*coeff);
        }

        // iprim satisfies (iprim % PRIM) == 0 with PRIM fixed at 1, so it is
        // always 1; kept as a field (rather than a constant) to mirror the
        // original codec's generality if PRIM ever became configurable.
        let mut iprim = 1u16;
        while iprim % PRIM != 0 {
            iprim += NN;
        }
        let iprim = iprim / PRIM;

        Ok(Self {
            nroots,
            genpoly,
            iprim,
        })
    }

    /// Number of parity (error-correction) symbols this code produces.
    pub fn nroots(&self) -> usize {
        self.nroots
    }

    /// Computes the `nroots` parity symbols for `data` via the generator
    /// polynomial's LFSR division.
    ///
    /// `data.len() + nroots` must not exceed 255.
    pub fn encode(&self, gf: &GfTables, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() + self.nroots > NN as usize {
            return Err(RsError::BlockTooLong);
        }

        let mut parity = vec![0u8; self.nroots];

        for &d in data {
            let feedback = gf.index_of(d ^ parity[0]);
            if feedback != A0 as u8 {
                for j in 1..self.nroots {
                    parity[j] ^= gf.alpha_to(
                        gf.modnn(feedback as i32 + self.genpoly[self.nroots - j] as i32),
                    );
                }
            }
            parity.copy_within(1.., 0);
            let last = self.nroots - 1;
            parity[last] = if feedback != A0 as u8 {
                gf.alpha_to(gf.modnn(feedback as i32 + self.genpoly[0] as i32))
            } else {
                0
            };
        }

        Ok(parity)
    }

    /// Corrects errors in `data` (a combined data+parity block) in place.
    ///
    /// Returns the number of symbol errors corrected, or
    /// [`RsError::Uncorrectable`] if more errors are present than the code
    /// can fix.
    pub fn decode(&self, gf: &GfTables, data: &mut [u8]) -> Result<usize> {
        if data.len() > NN as usize {
            return Err(RsError::BlockTooLong);
        }
        let nroots = self.nroots;
        let pad = NN as i32 - data.len() as i32;

        let mut s = vec![0u8; nroots];
        for slot in s.iter_mut() {
            *slot = data[0];
        }
        for &d in &data[1..] {
            for i in 0..nroots {
                s[i] = if s[i] == 0 {
                    d
                } else {
                    d ^ gf.alpha_to(gf.modnn(gf.index_of(s[i]) as i32 + (FCR as i32 + i as i32) * PRIM as i32))
                };
            }
        }

        let mut syn_error = 0u8;
        for slot in s.iter_mut() {
            syn_error |= *slot;
            *slot = gf.index_of(*slot);
        }

        if syn_error == 0 {
            log::trace!("Reed-Solomon block verified with zero errors");
            return Ok(0);
        }

        let mut lambda = vec![0u8; nroots + 1];
        lambda[0] = 1;
        let mut b = vec![0u8; nroots + 1];
        for i in 0..=nroots {
            b[i] = gf.index_of(lambda[i]);
        }

        let mut el: i32 = 0;
        let mut t = vec![0u8; nroots + 1];
        for r in 1..=nroots as i32 {
            let mut discr_r = 0u8;
            for i in 0..r as usize {
                if lambda[i] != 0 && s[r as usize - i - 1] != A0 as u8 {
                    discr_r ^= gf.alpha_to(
                        gf.modnn(gf.index_of(lambda[i]) as i32 + s[r as usize - i - 1] as i32),
                    );
                }
            }
            let discr_r = gf.index_of(discr_r);

            if discr_r == A0 as u8 {
                b.copy_within(0..nroots, 1);
                b[0] = A0 as u8;
            } else {
                t[0] = lambda[0];
                for i in 0..nroots {
                    t[i + 1] = if b[i] != A0 as u8 {
                        lambda[i + 1] ^ gf.alpha_to(gf.modnn(discr_r as i32 + b[i] as i32))
                    } else {
                        lambda[i + 1]
                    };
                }
                if 2 * el <= r - 1 {
                    el = r - el;
                    for i in 0..=nroots {
                        b[i] = if lambda[i] == 0 {
                            A0 as u8
                        } else {
                            gf.modnn(gf.index_of(lambda[i]) as i32 - discr_r as i32 + NN as i32)
                        };
                    }
                } else {
                    b.copy_within(0..nroots, 1);
                    b[0] = A0 as u8;
                }
                lambda.copy_from_slice(&t);
            }
        }

        let mut deg_lambda = 0usize;
        for i in 0..=nroots {
            lambda[i] = gf.index_of(lambda[i]);
            if lambda[i] != A0 as u8 {
                deg_lambda = i;
            }
        }

        let mut reg = vec![0u8; nroots + 1];
        reg[1..=nroots].copy_from_slice(&lambda[1..=nroots]);

        let mut root = vec![0u8; nroots];
        let mut loc = vec![0u8; nroots];
        let mut count = 0usize;
        let mut k = (self.iprim as i32) - 1;
        for i in 1..=NN as i32 {
            k = gf.modnn(k + self.iprim as i32) as i32;
            let mut q = 1u8;
            for j in (1..=deg_lambda).rev() {
                if reg[j] != A0 as u8 {
                    reg[j] = gf.modnn(reg[j] as i32 + j as i32);
                    q ^= gf.alpha_to(reg[j]);
                }
            }
            if q != 0 {
                continue;
            }
            root[count] = i as u8;
            loc[count] = k as u8;
            count += 1;
            if count == deg_lambda {
                break;
            }
        }

        if deg_lambda != count {
            log::warn!(
                "Reed-Solomon block uncorrectable: {} roots found for lambda degree {}",
                count,
                deg_lambda
            );
            return Err(RsError::Uncorrectable);
        }

        debug_assert!(deg_lambda >= 1, "syndrome was nonzero, lambda cannot be constant");
        let deg_omega = deg_lambda - 1;
        let mut omega = vec![0u8; nroots + 1];
        for i in 0..=deg_omega {
            let mut tmp = 0u8;
            for j in 0..=i {
                if s[i - j] != A0 as u8 && lambda[j] != A0 as u8 {
                    tmp ^= gf.alpha_to(gf.modnn(s[i - j] as i32 + lambda[j] as i32));
                }
            }
            omega[i] = gf.index_of(tmp);
        }

        for j in (0..count).rev() {
            let mut num1 = 0u8;
            for i in (0..=deg_omega).rev() {
                if omega[i] != A0 as u8 {
                    num1 ^= gf.alpha_to(gf.modnn(omega[i] as i32 + i as i32 * root[j] as i32));
                }
            }
            let num2 = gf.alpha_to(gf.modnn(root[j] as i32 * (FCR as i32 - 1) + NN as i32));
            let mut den = 0u8;

            let start = (deg_lambda.min(nroots - 1)) & !1usize;
            let mut i = start as i32;
            while i >= 0 {
                if lambda[i as usize + 1] != A0 as u8 {
                    den ^= gf.alpha_to(gf.modnn(
                        lambda[i as usize + 1] as i32 + i * root[j] as i32,
                    ));
                }
                i -= 2;
            }

            if num1 != 0 && loc[j] as i32 >= pad {
                let pos = loc[j] as i32 - pad;
                data[pos as usize] ^= gf.alpha_to(gf.modnn(
                    gf.index_of(num1) as i32 + gf.index_of(num2) as i32 + NN as i32
                        - gf.index_of(den) as i32,
                ));
            }
        }

        log::debug!("Reed-Solomon corrected {count} symbol errors");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_with_no_errors_reports_zero_corrections() {
        let gf = GfTables::new();
        let rs = RsBlock::new(&gf, 5).unwrap();
        let data: Vec<u8> = (0..10).collect();
        let parity = rs.encode(&gf, &data).unwrap();

        let mut block = data.clone();
        block.extend_from_slice(&parity);
        assert_eq!(rs.decode(&gf, &mut block).unwrap(), 0);
        assert_eq!(&block[..10], &data[..]);
    }

    #[test]
    fn decode_corrects_single_byte_error() {
        let gf = GfTables::new();
        let rs = RsBlock::new(&gf, 5).unwrap();
        let data: Vec<u8> = (0..10).map(|i| i * 7 + 1).collect();
        let parity = rs.encode(&gf, &data).unwrap();

        let mut block = data.clone();
        block.extend_from_slice(&parity);
        block[3] ^= 0xFF;

        let corrected = rs.decode(&gf, &mut block).unwrap();
        assert_eq!(corrected, 1);
        assert_eq!(&block[..10], &data[..]);
    }

    #[test]
    fn decode_corrects_up_to_half_nroots_errors() {
        let gf = GfTables::new();
        let rs = RsBlock::new(&gf, 8).unwrap();
        let data: Vec<u8> = (0..20).map(|i| (i * 13) as u8).collect();
        let parity = rs.encode(&gf, &data).unwrap();

        let mut block = data.clone();
        block.extend_from_slice(&parity);
        block[0] ^= 0x11;
        block[5] ^= 0x22;
        block[10] ^= 0x33;
        block[15] ^= 0x44;

        let corrected = rs.decode(&gf, &mut block).unwrap();
        assert_eq!(corrected, 4);
        assert_eq!(&block[..20], &data[..]);
    }

    #[test]
    fn decode_detects_uncorrectable_block() {
        let gf = GfTables::new();
        let rs = RsBlock::new(&gf, 4).unwrap();
        let data: Vec<u8> = (0..10).collect();
        let parity = rs.encode(&gf, &data).unwrap();

        let mut block = data.clone();
        block.extend_from_slice(&parity);
        for byte in block.iter_mut() {
            *byte ^= 0xAA;
        }

        assert_eq!(rs.decode(&gf, &mut block), Err(RsError::Uncorrectable));
    }

    #[test]
    fn new_rejects_zero_roots() {
        let gf = GfTables::new();
        assert_eq!(RsBlock::new(&gf, 0), Err(RsError::InvalidRootCount));
    }
}
