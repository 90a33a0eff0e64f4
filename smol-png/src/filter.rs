// Scanline reconstruction (PNG filter types 0-4).
// Operates in place on the row bytes that follow the filter tag; `prev` is
// the previous reconstructed row (all zero for the first row).

pub const FILTER_NONE: u8 = 0;
pub const FILTER_SUB: u8 = 1;
pub const FILTER_UP: u8 = 2;
pub const FILTER_AVERAGE: u8 = 3;
pub const FILTER_PAETH: u8 = 4;

/// Reconstruct one scanline in place; `bpp` is the back-reference distance.
/// Returns false for an unknown filter tag, in which case the row is left
/// untouched.
pub fn unfilter_row(filter: u8, row: &mut [u8], prev: &[u8], bpp: usize) -> bool {
    let len = row.len();
    debug_assert_eq!(len, prev.len());
    match filter {
        FILTER_NONE => {}
        FILTER_SUB => {
            for i in bpp..len {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FILTER_UP => {
            for i in 0..len {
                row[i] = row[i].wrapping_add(prev[i]);
            }
        }
        FILTER_AVERAGE => {
            for i in 0..bpp.min(len) {
                row[i] = row[i].wrapping_add(prev[i] / 2);
            }
            for i in bpp..len {
                let avg = (prev[i] as u16 + row[i - bpp] as u16) / 2;
                row[i] = row[i].wrapping_add(avg as u8);
            }
        }
        FILTER_PAETH => {
            // first pixel has no left neighbour: predictor reduces to `up`
            for i in 0..bpp.min(len) {
                row[i] = row[i].wrapping_add(prev[i]);
            }
            for i in bpp..len {
                let p = paeth(row[i - bpp], prev[i], prev[i - bpp]);
                row[i] = row[i].wrapping_add(p);
            }
        }
        _ => return false,
    }
    true
}

// nearest of left (a), above (b), upper-left (c) to a + b - c; ties a, b, c
#[inline]
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = a as i16;
    let b = b as i16;
    let c = c as i16;
    let p = a + b - c;
    let pa = (p - a).unsigned_abs();
    let pb = (p - b).unsigned_abs();
    let pc = (p - c).unsigned_abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

// reference encoder: the inverse of unfilter_row
#[cfg(test)]
pub(crate) fn filter_row(filter: u8, raw: &[u8], prev: &[u8], bpp: usize, out: &mut [u8]) {
    for i in 0..raw.len() {
        let a = if i >= bpp { raw[i - bpp] } else { 0 };
        let b = prev[i];
        let c = if i >= bpp { prev[i - bpp] } else { 0 };
        let pred = match filter {
            FILTER_NONE => 0,
            FILTER_SUB => a,
            FILTER_UP => b,
            FILTER_AVERAGE => ((a as u16 + b as u16) / 2) as u8,
            FILTER_PAETH => paeth(a, b, c),
            _ => unreachable!(),
        };
        out[i] = raw[i].wrapping_sub(pred);
    }
}
