//! Dockerfile rendering for a build spec.
//!
//! Both variants install torch and numpy with uv from the CPU-only wheel index.
//! With `use_uv` the uv binaries are copied into the image; without it uv is
//! bind-mounted for the install step only and leaves no trace in the layer.

use crate::spec::BuildSpec;
use crate::utils::template::{self, TemplateVars};

const BASE_STAGE: &str = "FROM python:{{python_version}}-slim\n\
WORKDIR /app\n";

const INSTALL_UV_COPIED: &str = "COPY --from=ghcr.io/astral-sh/uv:latest /uv /uvx /bin/\n\
RUN uv pip install --system torch=={{pytorch_version}} numpy \
--index-url https://download.pytorch.org/whl/cpu\n";

const INSTALL_UV_MOUNTED: &str =
    "RUN --mount=from=ghcr.io/astral-sh/uv,source=/uv,target=/bin/uv \\\n    \
uv pip install --system torch=={{pytorch_version}} numpy \
--index-url https://download.pytorch.org/whl/cpu\n";

pub fn render(spec: &BuildSpec) -> String {
    let install_stage = if spec.use_uv {
        INSTALL_UV_COPIED
    } else {
        INSTALL_UV_MOUNTED
    };

    let base = template::render(
        BASE_STAGE,
        &[(TemplateVars::PYTHON_VERSION, spec.python_version.as_str())],
    );
    let install = template::render(
        install_stage,
        &[(TemplateVars::PYTORCH_VERSION, spec.pytorch_version.as_str())],
    );

    base + &install
}
