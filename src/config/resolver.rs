use std::cell::RefCell;
use std::io::Write;
use std::path::Path;

use tracing::{debug, trace};

use super::file::{normalize, read_config_file, resolve_include};
use super::policy::{Diagnostics, ErrorPolicy, Outcome};
use super::source::{ConfigDocument, ConfigParser, FormatParser};
use super::tracker::Origin;
use super::{ResolutionError, VariableStore};
use crate::context::ResolveContext;

const OPERATION: &str = "resolve";

/// Resolves a tree of config files into one set of environment variables.
///
/// Each file is registered, read and parsed, then its includes are resolved
/// depth-first in listed order, and only then are its own variables merged.
/// This gives the following precedence for a shared key:
///
/// - a file's own variables override everything pulled in by its includes
/// - a later-listed include overrides an earlier-listed one
///
/// A file may be loaded at most once per run; a second reference to it, be it
/// a cycle or a diamond, fails with [`ResolutionError::DuplicateInclusion`].
///
/// Failures are reported through the [`ErrorPolicy`] at the frame that
/// detects them, with diagnostics going to stderr unless redirected. In force
/// mode the failing subtree is dropped and traversal continues with its
/// siblings; otherwise the error propagates unchanged to the caller and
/// nothing is returned.
///
/// ## Example
///
/// ```no_run
/// use envfold::Resolver;
///
/// let vars = Resolver::builder()
///     .force(true)
///     .build()
///     .resolve("app.yaml")?;
///
/// for (key, value) in vars.snapshot() {
///     println!("{key}={value}");
/// }
/// # Ok::<(), envfold::ResolutionError>(())
/// ```
#[derive(Debug)]
pub struct Resolver<P = FormatParser> {
    parser: P,
    policy: ErrorPolicy,
    diagnostics: RefCell<Diagnostics>,
}

impl Resolver {
    /// Creates a builder using the default YAML/TOML parser.
    pub fn builder() -> ResolverBuilder<FormatParser> {
        ResolverBuilder {
            parser: FormatParser,
            policy: ErrorPolicy::default(),
            diagnostics: Diagnostics::stderr(),
        }
    }
}

impl<P: ConfigParser> Resolver<P> {
    /// Runs a full resolution starting at `root` with a fresh context.
    pub fn resolve(&self, root: impl AsRef<Path>) -> Result<VariableStore, ResolutionError> {
        let mut ctx = ResolveContext::new();
        self.resolve_into(&mut ctx, root)?;
        Ok(ctx.into_store())
    }

    /// Resolves `root` into an existing run context.
    ///
    /// Files already registered in `ctx` count as loaded, and every handled
    /// failure is counted in [`ResolveContext::failures`].
    pub fn resolve_into(
        &self,
        ctx: &mut ResolveContext,
        root: impl AsRef<Path>,
    ) -> Result<(), ResolutionError> {
        self.resolve_file(ctx, Origin::Root, &normalize(root.as_ref()))
    }

    pub fn policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    fn resolve_file(
        &self,
        ctx: &mut ResolveContext,
        origin: Origin,
        path: &Path,
    ) -> Result<(), ResolutionError> {
        let document = match self.load(ctx, origin, path) {
            Ok(document) => document,
            Err(err) => return self.fail(ctx, err),
        };

        for include in &document.includes {
            let child = resolve_include(path, include);
            debug!(parent = %path.display(), include = %child.display(), "following include");
            // Failures below were already handled by the policy.
            self.resolve_file(ctx, Origin::file(path), &child)?;
        }

        for (key, value) in document.variables {
            trace!(file = %path.display(), %key, "merging variable");
            ctx.store.put(key, value);
        }

        Ok(())
    }

    fn load(
        &self,
        ctx: &mut ResolveContext,
        origin: Origin,
        path: &Path,
    ) -> Result<ConfigDocument, ResolutionError> {
        if let Some(previous) = ctx.tracker.register(origin.clone(), path) {
            return Err(ResolutionError::DuplicateInclusion {
                path: path.to_path_buf(),
                referrer: origin,
                origin: previous,
            });
        }

        let contents = read_config_file(path)?;
        let document = self
            .parser
            .parse(path, &contents)
            .map_err(|source| ResolutionError::ParseFailure {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            file = %path.display(),
            %origin,
            variables = document.variables.len(),
            includes = document.includes.len(),
            "loaded config document"
        );
        Ok(document)
    }

    fn fail(&self, ctx: &mut ResolveContext, err: ResolutionError) -> Result<(), ResolutionError> {
        ctx.failures += 1;
        let mut diagnostics = self.diagnostics.borrow_mut();
        match self.policy.handle(OPERATION, &err, &mut *diagnostics) {
            Outcome::Continue => Ok(()),
            Outcome::Abort => Err(err),
        }
    }
}

/// Builder for a [`Resolver`].
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ResolverBuilder<P> {
    parser: P,
    policy: ErrorPolicy,
    diagnostics: Diagnostics,
}

impl<P: ConfigParser> ResolverBuilder<P> {
    /// Suppresses the diagnostic printed for each failure.
    pub fn silent(mut self, silent: bool) -> Self {
        self.policy = ErrorPolicy::new(silent, self.policy.force());
        self
    }

    /// Keeps resolving after a failure instead of aborting the run.
    pub fn force(mut self, force: bool) -> Self {
        self.policy = ErrorPolicy::new(self.policy.silent(), force);
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Redirects failure diagnostics away from stderr.
    pub fn with_diagnostics(mut self, writer: impl Write + 'static) -> Self {
        self.diagnostics = Diagnostics::to_writer(writer);
        self
    }

    /// Replaces the document parser.
    pub fn with_parser<Q: ConfigParser>(self, parser: Q) -> ResolverBuilder<Q> {
        ResolverBuilder {
            parser,
            policy: self.policy,
            diagnostics: self.diagnostics,
        }
    }

    pub fn build(self) -> Resolver<P> {
        Resolver {
            parser: self.parser,
            policy: self.policy,
            diagnostics: RefCell::new(self.diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseError;
    use std::fs;
    use std::rc::Rc;

    /// Line-based format: `include <path>` or `KEY=VALUE`.
    #[derive(Debug)]
    struct LineParser;

    impl ConfigParser for LineParser {
        fn parse(&self, _path: &Path, contents: &[u8]) -> Result<ConfigDocument, ParseError> {
            let text = std::str::from_utf8(contents)?;
            let mut document = ConfigDocument::default();
            for line in text.lines() {
                if let Some(include) = line.strip_prefix("include ") {
                    document.includes.push(include.to_string());
                } else if let Some((key, value)) = line.split_once('=') {
                    document.variables.insert(key.to_string(), value.to_string());
                }
            }
            Ok(document)
        }
    }

    #[test]
    fn test_custom_parser() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("root.env"), "include child.env\nA=root\n").unwrap();
        fs::write(dir.path().join("child.env"), "A=child\nB=child\n").unwrap();

        let vars = Resolver::builder()
            .with_parser(LineParser)
            .silent(true)
            .build()
            .resolve(dir.path().join("root.env"))
            .unwrap();

        assert_eq!(vars.get("A"), Some("root"));
        assert_eq!(vars.get("B"), Some("child"));
    }

    #[test]
    fn test_resolve_into_shares_tracker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), "env_variables:\n  A: '1'\n").unwrap();

        let resolver = Resolver::builder().silent(true).build();
        let mut ctx = ResolveContext::new();
        resolver.resolve_into(&mut ctx, dir.path().join("a.yaml")).unwrap();
        let second = resolver.resolve_into(&mut ctx, dir.path().join("a.yaml"));

        assert!(matches!(
            second,
            Err(ResolutionError::DuplicateInclusion { origin: Origin::Root, .. })
        ));
        assert_eq!(ctx.store().get("A"), Some("1"));
        assert_eq!(ctx.tracker().visited(), 1);
        assert_eq!(ctx.failures(), 1);
    }

    #[test]
    fn test_with_policy() {
        let policy = ErrorPolicy::new(true, true);
        let resolver = Resolver::builder().with_policy(policy).build();
        assert_eq!(*resolver.policy(), policy);

        let resolver = Resolver::builder().silent(true).force(true).build();
        assert_eq!(*resolver.policy(), policy);
    }

    #[test]
    fn test_failures_are_counted_per_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.yaml"), "includes:\n  - missing.yaml\n").unwrap();
        fs::write(dir.path().join("clean.yaml"), "env_variables:\n  A: '1'\n").unwrap();

        let resolver = Resolver::builder().silent(true).force(true).build();

        let mut first = ResolveContext::new();
        resolver.resolve_into(&mut first, dir.path().join("broken.yaml")).unwrap();
        assert_eq!(first.failures(), 1);

        let mut second = ResolveContext::new();
        resolver.resolve_into(&mut second, dir.path().join("clean.yaml")).unwrap();
        assert_eq!(second.failures(), 0);
        assert_eq!(second.store().get("A"), Some("1"));
    }

    /// Cloneable in-memory writer for capturing diagnostics.
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_diagnostic_written_unless_silent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app.yaml");
        fs::write(&root, "includes:\n  - missing.yaml\n").unwrap();
        let missing = dir.path().join("missing.yaml");

        for force in [false, true] {
            let captured = Captured::default();
            let result = Resolver::builder()
                .force(force)
                .with_diagnostics(captured.clone())
                .build()
                .resolve(&root);
            assert_eq!(result.is_ok(), force);
            assert_eq!(
                captured.text(),
                format!("Error in resolve, config file not found: {}\n", missing.display())
            );

            let captured = Captured::default();
            let result = Resolver::builder()
                .silent(true)
                .force(force)
                .with_diagnostics(captured.clone())
                .build()
                .resolve(&root);
            assert_eq!(result.is_ok(), force);
            assert!(captured.text().is_empty());
        }
    }

    #[test]
    fn test_root_path_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("conf")).unwrap();
        fs::write(dir.path().join("app.yaml"), "env_variables:\n  A: '1'\n").unwrap();

        let vars = Resolver::builder()
            .silent(true)
            .build()
            .resolve(dir.path().join("conf/../app.yaml"))
            .unwrap();

        assert_eq!(vars.get("A"), Some("1"));
    }
}
