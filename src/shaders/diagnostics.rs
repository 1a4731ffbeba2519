//! Post-draw GL error check.

use crate::backend::GlBackend;
use crate::backend::types::gl;
use crate::error::GlError;

/// Upper bound on errors drained per check; a lost context can report forever.
const MAX_ERRORS_PER_CHECK: usize = 32;

/// Drain the backend's error queue, logging every entry under `site`.
pub fn check_gl_error<B: GlBackend>(backend: &B, site: &str) -> Vec<GlError> {
    let mut errors = Vec::new();
    while errors.len() < MAX_ERRORS_PER_CHECK {
        let code = match backend.get_error() {
            Some(code) if code != gl::NO_ERROR => code,
            _ => break,
        };
        let error = GlError {
            code,
            site: site.to_string(),
        };
        log::error!("{}", error);
        errors.push(error);
    }
    errors
}
