use crate::foundation::error::{IgError, IgResult};

/// Kernel radius and sigma for a canvas-style `shadowBlur` value.
///
/// The blur value is twice the Gaussian standard deviation; the kernel extends to three sigma.
pub(crate) fn shadow_kernel_params(shadow_blur: f32) -> (u32, f32) {
    if !shadow_blur.is_finite() || shadow_blur <= 0.0 {
        return (0, 1.0);
    }
    let sigma = shadow_blur * 0.5;
    let radius = (sigma * 3.0).ceil() as u32;
    (radius, sigma)
}

/// Normalized Gaussian weights in Q16 fixed point (sum is exactly `1 << 16`).
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> IgResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(IgError::invalid_input("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(IgError::invalid_input("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

/// Separable blur of premultiplied RGBA8 in place.
pub(crate) fn blur_rgba8_premul(
    data: &mut [u8],
    width: u32,
    height: u32,
    shadow_blur: f32,
) -> IgResult<()> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if data.len() != expected {
        return Err(IgError::invalid_input("blur buffer does not match its size"));
    }
    let (radius, sigma) = shadow_kernel_params(shadow_blur);
    let k = gaussian_kernel_q16(radius, sigma)?;
    if k.len() == 1 || width == 0 || height == 0 {
        return Ok(());
    }

    let mut tmp = vec![0u8; data.len()];
    horizontal_blur_q16(data, &mut tmp, width, height, &k);
    vertical_blur_q16(&tmp, data, width, height, &k);
    Ok(())
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i32 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i32 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
