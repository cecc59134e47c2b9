use anyhow::{Result, bail};
use candle_core::{DType, Tensor};

/// Mean of `hidden` `[B,T,H]` over unmasked tokens, then L2-normalized per row. Returns `[B,H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _seq, hidden_dim) = hidden.dims3()?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let sum = (hidden * &mask_3d)?.sum(1)?;
    let lengths = mask.sum_keepdim(1)?;
    let mean = sum.broadcast_div(&lengths)?;

    let eps_val = match hidden.dtype() { DType::F16 | DType::BF16 => 1e-6f64, _ => 1e-12f64 };
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps_val)?;
    let normalized = mean.broadcast_div(&norm)?;
    if normalized.dims() != [batch, hidden_dim] {
        bail!("pooled shape {:?} does not match [{}, {}]", normalized.dims(), batch, hidden_dim);
    }
    Ok(normalized)
}
