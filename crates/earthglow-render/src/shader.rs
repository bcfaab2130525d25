//! Shader module loading and caching.
//!
//! Every pipeline ships a built-in WGSL source. When a shader directory is
//! configured and contains a file of the expected name, that file is used
//! instead.

use log::{debug, info};
use std::{borrow::Cow, collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a shader's source came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderOrigin {
    BuiltIn,
    File(PathBuf),
}

/// Named cache of compiled shader modules.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched for `.wgsl` overrides.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// Compile the override file when present, the built-in source
    /// otherwise. A name that was already compiled returns the cached module.
    pub fn load_or_builtin(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        filename: &str,
        builtin: &'static str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(Arc::clone(module));
        }

        let (source, origin) = self.resolve_source(filename, builtin)?;
        match &origin {
            ShaderOrigin::File(path) => info!("Shader '{}' loaded from {}", name, path.display()),
            ShaderOrigin::BuiltIn => info!("Shader '{}' using built-in source", name),
        }

        debug!("Compiling shader '{}'", name);
        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source),
        }));
        self.modules.insert(name.to_string(), Arc::clone(&module));
        Ok(module)
    }

    /// Pick the source text for `filename` without compiling it.
    pub fn resolve_source(
        &self,
        filename: &str,
        builtin: &'static str,
    ) -> Result<(Cow<'static, str>, ShaderOrigin), ShaderError> {
        if let Some(dir) = &self.shader_dir {
            let path = dir.join(filename);
            if path.is_file() {
                let source = std::fs::read_to_string(&path).map_err(|source| ShaderError::Io {
                    path: path.clone(),
                    source,
                })?;
                return Ok((Cow::Owned(source), ShaderOrigin::File(path)));
            }
            debug!("No override at {}, using built-in", path.display());
        }
        Ok((Cow::Borrowed(builtin), ShaderOrigin::BuiltIn))
    }
}
