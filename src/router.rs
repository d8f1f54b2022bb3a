use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_io::Write;
use log::debug;

use crate::header::MIME_TEXT_PLAIN;
use crate::request::Method;
use crate::response::{StatusCode, not_found_body};
use crate::server::Exchange;

/// Which request methods a route accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteMethod {
    /// Any method
    Any,
    /// Only the given method
    Only(Method),
}

impl RouteMethod {
    fn accepts(self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(m) => m == method,
        }
    }
}

impl From<Method> for RouteMethod {
    fn from(value: Method) -> Self {
        Self::Only(value)
    }
}

/// Application callback producing the response for a request.  A handler that sends nothing
/// leaves the client with no response before the connection is dropped.
pub type Handler<C> = Box<dyn FnMut(&mut Exchange<'_, C>)>;

struct Route<C: Write> {
    method: RouteMethod,
    path: String,
    handler: Handler<C>,
}

impl<C: Write> Route<C> {
    fn matches(&self, method: Method, path: &str) -> bool {
        self.method.accepts(method) && self.path == path
    }
}

/// What `Router::dispatch` ended up running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dispatched {
    /// the route at this registration index
    Route(usize),
    NotFoundHandler,
    DefaultNotFound,
}

/// Routes in registration order plus the not found fallback
pub(crate) struct Router<C: Write> {
    routes: Vec<Route<C>>,
    not_found: Option<Handler<C>>,
}

impl<C: Write> Router<C> {
    pub(crate) fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: None,
        }
    }

    /// Append a route.  Duplicates are allowed; only the first one registered can match.
    pub(crate) fn add(&mut self, method: RouteMethod, path: &str, handler: Handler<C>) {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            handler,
        });
    }

    pub(crate) fn set_not_found(&mut self, handler: Handler<C>) {
        self.not_found = Some(handler);
    }

    /// Run the first route whose method and path match, else the not found handler, else a
    /// plain text 404 naming the path.
    pub(crate) fn dispatch(&mut self, exchange: &mut Exchange<'_, C>) -> Dispatched {
        let method = exchange.method();
        let path = exchange.uri();

        if let Some(index) = self.routes.iter().position(|r| r.matches(method, path)) {
            debug!("{:?} {} matched route {}", method, path, index);
            (self.routes[index].handler)(exchange);
            return Dispatched::Route(index);
        }

        debug!("{:?} {} has no route", method, path);
        if let Some(handler) = self.not_found.as_mut() {
            handler(exchange);
            return Dispatched::NotFoundHandler;
        }

        exchange.send(
            StatusCode::NotFound.code(),
            Some(MIME_TEXT_PLAIN),
            not_found_body(path),
        );
        Dispatched::DefaultNotFound
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::MockConnection;
    use crate::request::Request;
    use crate::response::Responder;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recording(log: &Log, name: &'static str) -> Handler<MockConnection> {
        let log = log.clone();
        Box::new(move |_: &mut Exchange<'_, MockConnection>| log.borrow_mut().push(name))
    }

    fn dispatch(router: &mut Router<MockConnection>, method: Method, path: &str) -> (Dispatched, String) {
        let request = Request::new(method, path.to_string(), "HTTP/1.1".to_string());
        let mut conn = MockConnection::new(vec![]);
        let dispatched = {
            let mut exchange = Exchange::new(&request, Responder::new(&mut conn, 1460));
            router.dispatch(&mut exchange)
        };
        (dispatched, conn.output_str())
    }

    #[test]
    fn test_first_match_wins() {
        let log = Log::default();
        let mut router = Router::new();
        router.add(Method::GET.into(), "/led", recording(&log, "first"));
        router.add(Method::GET.into(), "/led", recording(&log, "second"));

        for _ in 0..3 {
            assert_eq!(
                dispatch(&mut router, Method::GET, "/led").0,
                Dispatched::Route(0)
            );
        }
        assert_eq!(*log.borrow(), vec!["first", "first", "first"]);
    }

    #[test]
    fn test_method_filter() {
        let log = Log::default();
        let mut router = Router::new();
        router.add(Method::POST.into(), "/led", recording(&log, "post"));
        router.add(RouteMethod::Any, "/led", recording(&log, "any"));

        assert_eq!(
            dispatch(&mut router, Method::GET, "/led").0,
            Dispatched::Route(1)
        );
        assert_eq!(
            dispatch(&mut router, Method::POST, "/led").0,
            Dispatched::Route(0)
        );
        assert_eq!(*log.borrow(), vec!["any", "post"]);
    }

    #[test]
    fn test_paths_match_exactly() {
        let log = Log::default();
        let mut router = Router::new();
        router.add(RouteMethod::Any, "/led", recording(&log, "led"));

        for path in ["/led/", "/LED", "/le", "/led/on"] {
            assert_eq!(
                dispatch(&mut router, Method::GET, path).0,
                Dispatched::DefaultNotFound,
                "{path}"
            );
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_default_not_found() {
        let mut router = Router::new();

        let (dispatched, output) = dispatch(&mut router, Method::GET, "/missing");
        assert_eq!(dispatched, Dispatched::DefaultNotFound);
        assert_eq!(
            output,
            "HTTP/1.1 404 Not found\r\nContent-Type: text/plain\r\n\r\nNot found: /missing"
        );
    }

    #[test]
    fn test_not_found_handler() {
        let log = Log::default();
        let mut router = Router::new();
        router.add(RouteMethod::Any, "/", recording(&log, "root"));
        router.set_not_found(recording(&log, "not found"));

        let (dispatched, output) = dispatch(&mut router, Method::DELETE, "/missing");
        assert_eq!(dispatched, Dispatched::NotFoundHandler);
        assert_eq!(output, "");
        assert_eq!(*log.borrow(), vec!["not found"]);
    }
}
