//! Segment radix tree used to match request paths to declared resources.
//!
//! Paths are split on `/`. Each node holds one static segment, parameter
//! segments (`:name`) live in a separate child list and are only tried when
//! no static child leads to a match, so `/pet/findByStatus` wins over
//! `/pet/:petId` regardless of declaration order.
//!
//! A terminal node carries a route table: one entry per HTTP method in
//! declaration order. Matching is by path alone; picking the method is left
//! to the caller so it can answer 405 and `OPTIONS`.

use http::Method;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;

/// Path captures from a match, in path order.
pub type ParamVec = SmallVec<[(Arc<str>, String); 8]>;

/// Translate a declared path into the trie's syntax.
///
/// `{name}` becomes `:name`; the placeholder `{format}` is always `json`.
pub fn translate_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 1..start + len];
        if name == "format" {
            out.push_str("json");
        } else {
            out.push(':');
            out.push_str(name);
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

fn split_segments(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Methods declared on one path, in declaration order.
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    entries: Vec<(Method, Arc<T>)>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        RouteTable {
            entries: Vec::new(),
        }
    }
}

impl<T> RouteTable<T> {
    pub fn get(&self, method: &Method) -> Option<&Arc<T>> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, route)| route)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.entries.iter().map(|(m, _)| m)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert, returning `false` when the method is already taken.
    fn insert(&mut self, method: Method, route: Arc<T>) -> bool {
        if self.get(&method).is_some() {
            return false;
        }
        self.entries.push((method, route));
        true
    }
}

#[derive(Debug, Clone)]
struct RadixNode<T> {
    segment: Cow<'static, str>,
    routes: RouteTable<T>,
    param_name: Option<Arc<str>>,
    children: Vec<RadixNode<T>>,
    /// Different parameter names at the same position get separate children
    param_children: Vec<RadixNode<T>>,
}

impl<T> RadixNode<T> {
    fn new(segment: Cow<'static, str>) -> Self {
        Self {
            segment,
            routes: RouteTable::default(),
            param_name: None,
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    fn new_param(param_name: &str) -> Self {
        Self {
            param_name: Some(Arc::from(param_name)),
            ..Self::new(Cow::Borrowed(""))
        }
    }

    fn insert(&mut self, segments: &[&str], method: Method, route: Arc<T>) -> bool {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.insert(method, route);
        };

        if let Some(param_name) = segment.strip_prefix(':') {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(param_name))
            {
                return child.insert(remaining, method, route);
            }
            let mut child = RadixNode::new_param(param_name);
            let inserted = child.insert(remaining, method, route);
            self.param_children.push(child);
            return inserted;
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == *segment) {
            return child.insert(remaining, method, route);
        }
        let mut child = RadixNode::new(Cow::Owned(segment.to_string()));
        let inserted = child.insert(remaining, method, route);
        self.children.push(child);
        inserted
    }

    fn search<'a>(&'a self, segments: &[&str], params: &mut ParamVec) -> Option<&'a RouteTable<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return (!self.routes.is_empty()).then_some(&self.routes);
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(found) = child.search(remaining, params) {
                    return Some(found);
                }
            }
        }

        for child in &self.param_children {
            if let Some(name) = &child.param_name {
                params.push((name.clone(), segment.to_string()));
                if let Some(found) = child.search(remaining, params) {
                    return Some(found);
                }
                // backtrack
                params.pop();
            }
        }

        None
    }
}

/// Path trie over route tables.
#[derive(Debug, Clone)]
pub struct RadixRouter<T> {
    root: RadixNode<T>,
    routes_count: usize,
}

impl<T> Default for RadixRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RadixRouter<T> {
    pub fn new() -> Self {
        RadixRouter {
            root: RadixNode::new(Cow::Borrowed("")),
            routes_count: 0,
        }
    }

    /// Add a route for a path in trie syntax (see [`translate_path`]).
    ///
    /// Returns `false` when the path already has a route for `method`.
    pub fn insert(&mut self, path: &str, method: Method, route: Arc<T>) -> bool {
        let inserted = self.root.insert(&split_segments(path), method, route);
        if inserted {
            self.routes_count += 1;
        }
        inserted
    }

    /// Route table for `path` and the parameters captured on the way.
    pub fn find(&self, path: &str) -> Option<(&RouteTable<T>, ParamVec)> {
        let mut params = ParamVec::new();
        let table = self.root.search(&split_segments(path), &mut params)?;
        Some((table, params))
    }

    /// Route for `method` on `path`.
    pub fn route(&self, method: &Method, path: &str) -> Option<(Arc<T>, ParamVec)> {
        let (table, params) = self.find(path)?;
        table.get(method).map(|route| (route.clone(), params))
    }

    pub fn len(&self) -> usize {
        self.routes_count
    }

    pub fn is_empty(&self) -> bool {
        self.routes_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(routes: &[(Method, &str, &'static str)]) -> RadixRouter<&'static str> {
        let mut router = RadixRouter::new();
        for (method, path, name) in routes {
            assert!(router.insert(&translate_path(path), method.clone(), Arc::new(*name)));
        }
        router
    }

    fn param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_translate_path() {
        assert_eq!(translate_path("/pet/{petId}"), "/pet/:petId");
        assert_eq!(translate_path("/pet.{format}/{id}"), "/pet.json/:id");
        assert_eq!(translate_path("/health"), "/health");
        assert_eq!(translate_path("/broken/{id"), "/broken/{id");
    }

    #[test]
    fn test_radix_router_simple_route() {
        let router = router(&[(Method::GET, "/health", "health_check")]);
        let (route, params) = router.route(&Method::GET, "/health").unwrap();
        assert_eq!(*route, "health_check");
        assert!(params.is_empty());
    }

    #[test]
    fn test_radix_router_multiple_parameters() {
        let router = router(&[(Method::GET, "/users/{user_id}/posts/{post_id}", "get_post")]);
        let (route, params) = router.route(&Method::GET, "/users/123/posts/456").unwrap();
        assert_eq!(*route, "get_post");
        assert_eq!(param(&params, "user_id"), Some("123"));
        assert_eq!(param(&params, "post_id"), Some("456"));
    }

    #[test]
    fn test_radix_router_static_beats_parameter() {
        let router = router(&[
            (Method::GET, "/pet/{petId}", "get_pet"),
            (Method::GET, "/pet/findByStatus", "find_by_status"),
        ]);
        assert_eq!(*router.route(&Method::GET, "/pet/findByStatus").unwrap().0, "find_by_status");
        assert_eq!(*router.route(&Method::GET, "/pet/7").unwrap().0, "get_pet");
    }

    #[test]
    fn test_radix_router_backtracks_params() {
        let router = router(&[
            (Method::GET, "/users/{id}/posts", "posts"),
            (Method::GET, "/users/{user_id}/comments", "comments"),
        ]);
        let (route, params) = router.route(&Method::GET, "/users/9/comments").unwrap();
        assert_eq!(*route, "comments");
        assert_eq!(params.len(), 1);
        assert_eq!(param(&params, "user_id"), Some("9"));
    }

    #[test]
    fn test_route_table_keeps_declaration_order() {
        let router = router(&[
            (Method::POST, "/pet", "add"),
            (Method::PUT, "/pet", "update"),
            (Method::GET, "/pet", "list"),
        ]);
        let (table, _) = router.find("/pet").unwrap();
        let methods: Vec<&str> = table.methods().map(Method::as_str).collect();
        assert_eq!(methods, vec!["POST", "PUT", "GET"]);
        assert!(router.route(&Method::DELETE, "/pet").is_none());
        assert_eq!(router.len(), 3);
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let mut router = router(&[(Method::GET, "/pet", "list")]);
        assert!(!router.insert("/pet", Method::GET, Arc::new("again")));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_no_match_and_intermediate_nodes() {
        let router = router(&[(Method::GET, "/a/b/c", "deep")]);
        assert!(router.find("/a/b").is_none());
        assert!(router.find("/x").is_none());
        assert!(router.find("/a/b/c/").is_some());
    }
}
