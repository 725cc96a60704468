//! Causal text generation with a Qwen2 model on candle.

use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::qwen2::{Config as Qwen2Config, ModelForCausalLM};
use tokenizers::Tokenizer;
use tracing::info;

use super::{hub, non_empty, Error, Generation, Result, TextGenerator};

/// Sampling and length settings applied to every generation request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_new_tokens: usize,
    pub temperature: f64,
    pub top_k: usize,
    pub top_p: f64,
    pub seed: u64,
}

pub struct CausalGenerator {
    // Decoding fills the model's KV cache, so requests take the model
    // exclusively and the cache is cleared on entry.
    model: Mutex<ModelForCausalLM>,
    tokenizer: Tokenizer,
    device: Device,
    eos_tokens: Vec<u32>,
    options: GenerationOptions,
}

impl CausalGenerator {
    /// Fetch weights, config, and tokenizer from the Hub and build the model
    /// on CPU.
    pub fn load(model_id: &str, options: GenerationOptions) -> Result<Self> {
        let device = Device::Cpu;

        let tokenizer_path = hub::fetch(model_id, "tokenizer.json")?;
        let config_path = hub::fetch(model_id, "config.json")?;
        let weights_path = hub::fetch(model_id, "model.safetensors")?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;
        let config: Qwen2Config = serde_json::from_slice(&std::fs::read(&config_path)?)
            .map_err(|e| Error::Config(e.to_string()))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device) }
            .map_err(|e| Error::Model(e.to_string()))?;
        let model = ModelForCausalLM::new(&config, vb).map_err(|e| Error::Model(e.to_string()))?;

        let eos_tokens: Vec<u32> = ["<|endoftext|>", "<|im_end|>"]
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();

        info!("generator ready: {}", model_id);
        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            eos_tokens,
            options,
        })
    }

    fn sampling(&self) -> Sampling {
        if self.options.temperature <= 0.0 {
            Sampling::ArgMax
        } else {
            Sampling::TopKThenTopP {
                k: self.options.top_k,
                p: self.options.top_p,
                temperature: self.options.temperature,
            }
        }
    }
}

impl TextGenerator for CausalGenerator {
    fn generate(&self, prompt: &str) -> Result<Generation> {
        let prompt = non_empty(prompt)?;

        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;
        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        let prompt_len = tokens.len();

        let mut logits_processor = LogitsProcessor::from_sampling(self.options.seed, self.sampling());

        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::Model("generator lock poisoned".to_string()))?;
        model.clear_kv_cache();

        for index in 0..self.options.max_new_tokens {
            // Full prompt on the first pass, then one token at a time against
            // the KV cache.
            let context_size = if index > 0 { 1 } else { tokens.len() };
            let start_pos = tokens.len() - context_size;
            let input = Tensor::new(&tokens[start_pos..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| Error::Model(e.to_string()))?;

            let logits = model
                .forward(&input, start_pos)
                .and_then(|t| t.squeeze(0))
                .and_then(|t| t.squeeze(0))
                .and_then(|t| t.to_dtype(DType::F32))
                .map_err(|e| Error::Model(e.to_string()))?;

            let next = logits_processor
                .sample(&logits)
                .map_err(|e| Error::Model(e.to_string()))?;
            tokens.push(next);
            if self.eos_tokens.contains(&next) {
                break;
            }
        }

        let text = self
            .tokenizer
            .decode(&tokens[prompt_len..], true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        Ok(Generation {
            text: text.trim().to_string(),
            tokens_generated: tokens.len() - prompt_len,
        })
    }
}
