//! Shader catalog.
//!
//! Named shaders expand to viewer shader code; anything else is taken to be
//! shader code already.

use std::collections::BTreeMap;

pub trait ShaderCatalog {
    fn lookup(&self, name: &str) -> Option<String>;

    /// Catalog entry for `shader`, or `shader` itself.
    fn resolve(&self, shader: &str) -> String {
        self.lookup(shader).unwrap_or_else(|| shader.to_string())
    }
}

/// Built-in intensity shaders and colormaps.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    shaders: BTreeMap<String, String>,
}

fn emit(expression: &str) -> String {
    format!("#uicontrol invlerp normalized\nvoid main() {{\n  {expression};\n}}\n")
}

impl ShaderLibrary {
    pub fn empty() -> Self {
        Self {
            shaders: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut library = Self::empty();
        library.insert("greyscale", emit("emitGrayscale(normalized())"));
        library.insert("grayscale", emit("emitGrayscale(normalized())"));
        library.insert("red", emit("emitRGB(vec3(normalized(), 0, 0))"));
        library.insert("green", emit("emitRGB(vec3(0, normalized(), 0))"));
        library.insert("blue", emit("emitRGB(vec3(0, 0, normalized()))"));
        library.insert("jet", emit("emitRGB(colormapJet(normalized()))"));
        library.insert("cubehelix", emit("emitRGB(colormapCubehelix(normalized()))"));
        library
    }

    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.shaders.insert(name.into().to_lowercase(), code.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.shaders.keys().map(String::as_str)
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ShaderCatalog for ShaderLibrary {
    fn lookup(&self, name: &str) -> Option<String> {
        self.shaders.get(&name.to_lowercase()).cloned()
    }
}
