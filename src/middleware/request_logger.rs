use std::rc::Rc;
use std::time::Instant;

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::Error;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, info, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tags every response with a fresh `X-Request-ID` and logs method, path,
/// status and latency under that id
pub struct RequestLogger {
    verbose: bool,
}

impl RequestLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggerMiddleware {
            service: Rc::new(service),
            verbose: self.verbose,
        })
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: Rc<S>,
    verbose: bool,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verbose = self.verbose;
        let method = req.method().clone();
        let path = req.path().to_owned();
        let started = Instant::now();
        let request_id = Uuid::new_v4().to_string();

        if verbose {
            debug!("[{}] Processing request: {} {}", request_id, method, path);
        }

        Box::pin(async move {
            let mut res = service.call(req).await;
            let latency = started.elapsed();

            if let (Ok(response), Ok(value)) = (res.as_mut(), HeaderValue::from_str(&request_id)) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            match &res {
                Ok(response) if response.status().is_server_error() => warn!(
                    "[{}] {} {} | Status: {} | Latency: {:?}",
                    request_id,
                    method,
                    path,
                    response.status(),
                    latency
                ),
                Ok(response) => info!(
                    "[{}] {} {} | Status: {} | Latency: {:?}",
                    request_id,
                    method,
                    path,
                    response.status(),
                    latency
                ),
                Err(e) => warn!(
                    "[{}] {} {} | Error: {} | Latency: {:?}",
                    request_id, method, path, e, latency
                ),
            }

            res
        })
    }
}
