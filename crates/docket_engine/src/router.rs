use tracing::debug;

use docket_base::DocketResult;
use docket_base::pal::http::{HttpRequest, HttpResponse, HttpService};

use crate::registry::{EndpointRegistry, RegistrationKey};
use crate::unit::HostBinding;

/// Serves whatever is registered for one (server, host) pair, by request path.
#[derive(Debug, Clone)]
pub struct HostRouter {
    registry: EndpointRegistry,
    binding: HostBinding,
}

impl HostRouter {
    pub fn new(registry: EndpointRegistry, binding: HostBinding) -> Self {
        Self { registry, binding }
    }

    fn key_for(&self, request: &HttpRequest) -> RegistrationKey {
        let path = request.path_only();
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        RegistrationKey::new(&self.binding, path)
    }
}

impl HttpService for HostRouter {
    fn handle_request(&self, request: HttpRequest) -> DocketResult<HttpResponse> {
        let key = self.key_for(&request);
        match self.registry.lookup(&key) {
            Some(binding) => binding.handler.handle_request(request),
            None => {
                debug!(%key, "no endpoint bound");
                Ok(HttpResponse::not_found().with_body(format!("No endpoint at {}", key.path)))
            }
        }
    }
}
