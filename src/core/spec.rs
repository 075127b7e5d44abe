use serde::Serialize;

/// One cell of the build matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuildSpec {
    pub python_version: String,
    pub pytorch_version: String,
    /// Bake uv into the image instead of mounting it for the install step.
    pub use_uv: bool,
}

impl BuildSpec {
    pub fn new(
        python_version: impl Into<String>,
        pytorch_version: impl Into<String>,
        use_uv: bool,
    ) -> Self {
        Self {
            python_version: python_version.into(),
            pytorch_version: pytorch_version.into(),
            use_uv,
        }
    }

    pub fn tag(&self) -> String {
        let uv_suffix = if self.use_uv { "-uv" } else { "" };
        format!(
            "py{}-torch{}{}",
            self.python_version, self.pytorch_version, uv_suffix
        )
    }
}

/// Registry namespace and image name shared by every build in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub namespace: String,
    pub image_name: String,
}

impl ImageTarget {
    pub fn new(namespace: impl Into<String>, image_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            image_name: image_name.into(),
        }
    }

    /// `{namespace}/{image_name}:{tag}`
    pub fn full_tag(&self, spec: &BuildSpec) -> String {
        format!("{}/{}:{}", self.namespace, self.image_name, spec.tag())
    }
}
