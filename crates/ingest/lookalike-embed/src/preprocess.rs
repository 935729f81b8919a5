use candle_core::{DType, Device, Tensor};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::error::ModelLoadError;

pub const CLIP_IMAGE_SIZE: usize = 224;
pub const CLIP_CONTEXT_LENGTH: usize = 77;
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

const END_OF_TEXT: &str = "<|endoftext|>";

/// The transforms that turn raw inputs into model-ready tensors.
pub struct Preprocess {
    pub image: ImagePreprocessor,
    pub text: TextPreprocessor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePreprocessor {
    pub size: usize,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self {
            size: CLIP_IMAGE_SIZE,
            mean: CLIP_MEAN,
            std: CLIP_STD,
        }
    }
}

impl ImagePreprocessor {
    /// Resize the shortest side to `size`, center crop, scale to [0, 1] and normalize.
    ///
    /// `rgb` is a packed row-major RGB8 buffer. Returns a `(3, size, size)` f32 tensor.
    /// Resizing is nearest-neighbour, not the bicubic filter the reference CLIP
    /// pipeline uses, so embeddings are close to but not bit-identical with it.
    pub fn apply(
        &self,
        rgb: &[u8],
        width: usize,
        height: usize,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        if width == 0 || height == 0 {
            candle_core::bail!("image has zero extent ({width}x{height})");
        }
        let Some(expected_len) = width.checked_mul(height).and_then(|n| n.checked_mul(3)) else {
            candle_core::bail!("image dimensions {width}x{height} overflow");
        };
        if rgb.len() != expected_len {
            candle_core::bail!(
                "expected {expected_len} bytes for a {width}x{height} RGB image, got {}",
                rgb.len()
            );
        }

        let short = width.min(height);
        let scale = |side: usize| {
            side.checked_mul(self.size)
                .and_then(|n| n.checked_add(short / 2))
                .map(|n| (n / short).max(self.size))
        };
        let (Some(scaled_h), Some(scaled_w)) = (scale(height), scale(width)) else {
            candle_core::bail!("image dimensions {width}x{height} overflow at size {}", self.size);
        };

        let pixels = Tensor::from_vec(rgb.to_vec(), (height, width, 3), device)?
            .permute((2, 0, 1))?
            .contiguous()?
            .to_dtype(DType::F32)?
            .unsqueeze(0)?
            .upsample_nearest2d(scaled_h, scaled_w)?
            .squeeze(0)?;

        let top = (scaled_h - self.size) / 2;
        let left = (scaled_w - self.size) / 2;
        let cropped = pixels
            .narrow(1, top, self.size)?
            .narrow(2, left, self.size)?;

        let mean = Tensor::new(&self.mean, device)?.reshape((3, 1, 1))?;
        let std = Tensor::new(&self.std, device)?.reshape((3, 1, 1))?;
        (cropped / 255.0)?.broadcast_sub(&mean)?.broadcast_div(&std)
    }
}

pub struct TextPreprocessor {
    tokenizer: Tokenizer,
}

impl TextPreprocessor {
    /// Configure `tokenizer` for CLIP's fixed context window.
    pub fn new(mut tokenizer: Tokenizer) -> Result<Self, ModelLoadError> {
        let pad_id = tokenizer.token_to_id(END_OF_TEXT).unwrap_or(0);
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(CLIP_CONTEXT_LENGTH),
            pad_id,
            pad_token: END_OF_TEXT.to_string(),
            ..Default::default()
        }));
        tokenizer.with_truncation(Some(TruncationParams {
            max_length: CLIP_CONTEXT_LENGTH,
            ..Default::default()
        }))?;
        Ok(Self { tokenizer })
    }

    /// Token ids for `texts`, shape `(texts.len(), 77)`.
    pub fn encode(&self, texts: &[&str], device: &Device) -> Result<Tensor, ModelLoadError> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true)?;
        let rows: Result<Vec<Tensor>, _> = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), device))
            .collect();
        Ok(Tensor::stack(&rows?, 0)?)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn solid(width: usize, height: usize, value: u8) -> Vec<u8> {
        vec![value; width * height * 3]
    }

    #[test]
    fn output_is_square_crop_of_configured_size() {
        let pre = ImagePreprocessor::default();
        let out = pre.apply(&solid(64, 32, 0), 64, 32, &Device::Cpu).unwrap();
        assert_eq!(out.dims(), &[3, CLIP_IMAGE_SIZE, CLIP_IMAGE_SIZE]);
    }

    #[test]
    fn white_pixels_normalize_per_channel() {
        let pre = ImagePreprocessor {
            size: 4,
            ..Default::default()
        };
        let out = pre.apply(&solid(2, 2, 255), 2, 2, &Device::Cpu).unwrap();
        let values: Vec<Vec<Vec<f32>>> = out.to_vec3().unwrap();
        for (c, channel) in values.iter().enumerate() {
            let expected = (1.0 - CLIP_MEAN[c]) / CLIP_STD[c];
            for v in channel.iter().flatten() {
                assert!((v - expected).abs() < 1e-5, "channel {c}: {v} != {expected}");
            }
        }
    }

    #[test]
    fn crop_keeps_the_center() {
        // 3 wide, 1 tall: left and right columns black, middle white.
        let rgb = [0, 0, 0, 255, 255, 255, 0, 0, 0];
        let pre = ImagePreprocessor {
            size: 1,
            mean: [0.0; 3],
            std: [1.0; 3],
        };
        let out = pre.apply(&rgb, 3, 1, &Device::Cpu).unwrap();
        let values: Vec<Vec<Vec<f32>>> = out.to_vec3().unwrap();
        assert_eq!(values[0][0][0], 1.0);
    }

    #[test]
    fn huge_dimensions_are_rejected_not_panicking() {
        let pre = ImagePreprocessor::default();
        assert!(pre.apply(&[], usize::MAX / 2, 3, &Device::Cpu).is_err());
        assert!(pre.apply(&[], usize::MAX, usize::MAX, &Device::Cpu).is_err());
        // Buffer length fits, but scaling the long side overflows.
        let pre = ImagePreprocessor {
            size: usize::MAX / 2,
            ..Default::default()
        };
        assert!(pre.apply(&solid(3, 1, 0), 3, 1, &Device::Cpu).is_err());
    }

    // WordLevel over whitespace: one id per word, "<|endoftext|>" deliberately not id 0.
    fn word_tokenizer() -> Tokenizer {
        let json = r#"{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "<unk>": 0, "a": 1, "b": 2, "<|endoftext|>": 5 },
                "unk_token": "<unk>"
            }
        }"#;
        Tokenizer::from_str(json).unwrap()
    }

    #[test]
    fn short_text_is_padded_with_end_of_text() {
        let text = TextPreprocessor::new(word_tokenizer()).unwrap();
        let ids = text.encode(&["a b"], &Device::Cpu).unwrap();
        assert_eq!(ids.dims(), &[1, CLIP_CONTEXT_LENGTH]);

        let rows: Vec<Vec<u32>> = ids.to_vec2().unwrap();
        assert_eq!(&rows[0][..2], &[1, 2]);
        assert!(rows[0][2..].iter().all(|&id| id == 5));
    }

    #[test]
    fn long_text_is_truncated_to_context_length() {
        let text = TextPreprocessor::new(word_tokenizer()).unwrap();
        let long = vec!["a"; CLIP_CONTEXT_LENGTH + 23].join(" ");
        let ids = text.encode(&["b", long.as_str()], &Device::Cpu).unwrap();
        assert_eq!(ids.dims(), &[2, CLIP_CONTEXT_LENGTH]);

        let rows: Vec<Vec<u32>> = ids.to_vec2().unwrap();
        assert_eq!(rows[0][0], 2);
        assert!(rows[0][1..].iter().all(|&id| id == 5));
        assert!(rows[1].iter().all(|&id| id == 1));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let pre = ImagePreprocessor::default();
        assert!(pre.apply(&[0u8; 5], 2, 2, &Device::Cpu).is_err());
        assert!(pre.apply(&[], 0, 2, &Device::Cpu).is_err());
    }
}
