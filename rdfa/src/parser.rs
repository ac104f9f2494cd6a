//! Implementation of the [RDFa](https://www.w3.org/TR/rdfa-core/)
//! tree-walking evaluation algorithm.

use crate::context::{
    fresh_list_mapping, EvaluationContext, IncompleteTriple, ListMapping, NoProfileLoader, Profile,
    ProfileLoader, RdfaSyntax,
};
use crate::dom::Document;
use crate::error::{Interrupt, RdfaError};
use crate::vocab::{
    TermMappings, RDFA_JSON, RDFA_USES_VOCABULARY, RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE,
    RDF_XML_LITERAL, XHTML_NAMESPACE, XHTML_VOCAB_NAMESPACE, XHTML_VOCABULARY, XSD_DATE,
    XSD_DATE_TIME, XSD_DURATION, XSD_G_YEAR, XSD_G_YEAR_MONTH, XSD_TIME,
};
use once_cell::sync::Lazy;
use oxiri::Iri;
use regex::Regex;
use std::rc::Rc;
use tern_api::handler::RdfHandler;
use tern_api::model::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use tern_api::scope::NamespaceScope;

static PREFIX_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(?P<prefix>[^\s]*):\s+(?P<url>[^\s]+)").expect("prefix pattern is valid")
});

// most specific first; a @datetime value takes the first matching type
static DATETIME_TYPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"^-?P(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?$",
            XSD_DURATION,
        ),
        (
            r"^-?\d{4,}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:\d{2})?$",
            XSD_DATE_TIME,
        ),
        (r"^-?\d{4,}-\d{2}-\d{2}(?:Z|[+-]\d{2}:\d{2})?$", XSD_DATE),
        (
            r"^\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:\d{2})?$",
            XSD_TIME,
        ),
        (r"^-?\d{4,}-\d{2}$", XSD_G_YEAR_MONTH),
        (r"^-?\d{4,}$", XSD_G_YEAR),
    ]
    .iter()
    .map(|(pattern, datatype)| {
        (
            Regex::new(pattern).expect("datetime pattern is valid"),
            *datatype,
        )
    })
    .collect()
});

type WarningHandler = Option<Box<dyn FnMut(&str)>>;

/// An [RDFa](https://www.w3.org/TR/rdfa-core/) parser walking an abstract
/// document tree.
///
/// Structural problems abort the parse; everything RDFa defines as
/// recoverable (unresolvable CURIEs and terms, missing profiles, version
/// auto-detection) goes to the warning channel and drops only the value
/// involved.
///
/// ```
/// use tern_api::handler::CollectingHandler;
/// use tern_rdfa::dom::{Document, SimpleTree};
/// use tern_rdfa::{RdfaParser, RdfaSyntax};
///
/// // <html><body><div about="http://example.com/a" typeof="http://example.com/T" /></body></html>
/// let mut tree = SimpleTree::new("html");
/// let body = tree.append_element(tree.root(), "body");
/// let div = tree.append_element(body, "div");
/// tree.set_attribute(div, "about", "http://example.com/a");
/// tree.set_attribute(div, "typeof", "http://example.com/T");
///
/// let mut sink = CollectingHandler::default();
/// RdfaParser::new(RdfaSyntax::Rdfa11).parse(&mut tree, &mut sink)?;
/// assert_eq!(
///     "<http://example.com/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.com/T>",
///     sink.triples[0].to_string()
/// );
/// # Ok::<_, tern_rdfa::RdfaError>(())
/// ```
pub struct RdfaParser {
    syntax: RdfaSyntax,
    base_iri: Option<Iri<String>>,
    profile_loader: Box<dyn ProfileLoader>,
    warning_handler: WarningHandler,
}

impl RdfaParser {
    pub fn new(syntax: RdfaSyntax) -> Self {
        Self {
            syntax,
            base_iri: None,
            profile_loader: Box::new(NoProfileLoader),
            warning_handler: None,
        }
    }

    /// Builds a parser with an initial base IRI for relative IRI resolution.
    pub fn with_base_iri(syntax: RdfaSyntax, base_iri: &str) -> Result<Self, RdfaError> {
        let base = Iri::parse(base_iri.to_owned())
            .map_err(|error| RdfaError::invalid_base_iri(base_iri, error))?;
        Ok(Self {
            base_iri: Some(base),
            ..Self::new(syntax)
        })
    }

    /// Replaces the `@profile` loader. The default resolves nothing.
    pub fn with_profile_loader(mut self, loader: impl ProfileLoader + 'static) -> Self {
        self.profile_loader = Box::new(loader);
        self
    }

    /// Routes warnings to `callback` instead of the `log` crate.
    pub fn set_warning_handler(&mut self, callback: impl FnMut(&str) + 'static) {
        self.warning_handler = Some(Box::new(callback));
    }

    /// Walks the whole document, reporting into `handler`.
    ///
    /// `start_rdf` is called first and `end_rdf` exactly once at the end:
    /// with `false` if a fatal error aborted the walk, with `true`
    /// otherwise, including when the handler itself requested the stop.
    pub fn parse<D: Document, H: RdfHandler>(
        &mut self,
        document: &mut D,
        handler: &mut H,
    ) -> Result<(), RdfaError> {
        handler.start_rdf();
        match self.evaluate(document, handler) {
            Ok(()) | Err(Interrupt::Stop) => {
                handler.end_rdf(true);
                Ok(())
            }
            Err(Interrupt::Error(error)) => {
                handler.end_rdf(false);
                Err(error)
            }
        }
    }

    fn evaluate<D: Document, H: RdfHandler>(
        &mut self,
        document: &mut D,
        handler: &mut H,
    ) -> Result<(), Interrupt> {
        let version = detect_version(self.syntax, document, &mut self.warning_handler);

        // a <base href> permanently changes the base, its query/fragment
        // parts dropped
        let mut base_iri = self.base_iri.clone();
        if let Some(href) = find_base_href(document) {
            let trimmed = match href.find(|c| c == '?' || c == '#') {
                Some(index) => &href[..index],
                None => href.as_str(),
            };
            base_iri = Some(
                Iri::parse(trimmed.to_owned())
                    .map_err(|error| RdfaError::invalid_base_iri(trimmed, error))?,
            );
        }

        // xml:base has no effect in (X)HTML
        let xml_base_allowed = document.element_name(document.root()) != "html";

        let mut scope = NamespaceScope::default();
        scope.bind("", XHTML_VOCAB_NAMESPACE);

        let mut walk = Walk {
            document,
            handler,
            version,
            scope,
            xml_base_allowed,
            bnode_counter: 0,
            profile_loader: &mut *self.profile_loader,
            warnings: &mut self.warning_handler,
        };
        let eval = EvaluationContext::new(base_iri);
        walk.process_element(walk.document.root(), &eval)
    }
}

fn warn(handler: &mut WarningHandler, message: &str) {
    match handler {
        Some(callback) => callback(message),
        None => log::warn!("{}", message),
    }
}

fn detect_version<D: Document>(
    syntax: RdfaSyntax,
    document: &D,
    warnings: &mut WarningHandler,
) -> RdfaSyntax {
    match syntax {
        RdfaSyntax::Rdfa10 | RdfaSyntax::Rdfa11 => syntax,
        RdfaSyntax::AutoDetect | RdfaSyntax::AutoDetectLegacy => {
            let fallback = if syntax == RdfaSyntax::AutoDetect {
                RdfaSyntax::Rdfa11
            } else {
                RdfaSyntax::Rdfa10
            };
            match document.attribute(document.root(), "version") {
                Some(version) if version.contains("RDFa 1.0") => RdfaSyntax::Rdfa10,
                Some(version) if version.contains("RDFa 1.1") => RdfaSyntax::Rdfa11,
                Some(version) => {
                    warn(
                        warnings,
                        &format!(
                            "the value '{}' is not a known value for the @version attribute - assuming {}",
                            version,
                            version_name(fallback)
                        ),
                    );
                    fallback
                }
                None => {
                    warn(
                        warnings,
                        &format!(
                            "no @version attribute on the document element - assuming {}",
                            version_name(fallback)
                        ),
                    );
                    fallback
                }
            }
        }
    }
}

fn version_name(version: RdfaSyntax) -> &'static str {
    if version == RdfaSyntax::Rdfa10 {
        "RDFa 1.0"
    } else {
        "RDFa 1.1"
    }
}

fn find_base_href<D: Document>(document: &D) -> Option<String> {
    let mut stack = vec![document.root()];
    while let Some(node) = stack.pop() {
        if !document.is_element(node) {
            continue;
        }
        if document.element_name(node) == "base" {
            match document.attribute(node, "href") {
                Some(href) if !href.is_empty() => return Some(href),
                _ => {}
            }
        }
        stack.extend(document.children(node));
    }
    None
}

/// One in-flight tree walk: the document, the sink and the shared scope.
struct Walk<'a, D: Document, H: RdfHandler> {
    document: &'a mut D,
    handler: &'a mut H,
    version: RdfaSyntax,
    scope: NamespaceScope,
    xml_base_allowed: bool,
    bnode_counter: u64,
    profile_loader: &'a mut dyn ProfileLoader,
    warnings: &'a mut WarningHandler,
}

impl<'a, D: Document, H: RdfHandler> Walk<'a, D, H> {
    fn warn(&mut self, message: &str) {
        warn(self.warnings, message);
    }

    fn fresh_blank_node(&mut self) -> BlankNode {
        self.bnode_counter += 1;
        BlankNode {
            id: format!("rdfa{:08}", self.bnode_counter),
        }
    }

    fn emit(&mut self, triple: Triple) -> Result<(), Interrupt> {
        if self.handler.handle_triple(triple) {
            Ok(())
        } else {
            Err(Interrupt::Stop)
        }
    }

    fn emit_list(
        &mut self,
        subject: &Subject,
        predicate: &NamedNode,
        members: &[Term],
    ) -> Result<(), Interrupt> {
        let mut rest = Term::from(NamedNode {
            iri: RDF_NIL.to_owned(),
        });
        for member in members.iter().rev() {
            let node = self.fresh_blank_node();
            self.emit(Triple {
                subject: node.clone().into(),
                predicate: NamedNode {
                    iri: RDF_FIRST.to_owned(),
                },
                object: member.clone(),
            })?;
            self.emit(Triple {
                subject: node.clone().into(),
                predicate: NamedNode {
                    iri: RDF_REST.to_owned(),
                },
                object: rest,
            })?;
            rest = node.into();
        }
        self.emit(Triple {
            subject: subject.clone(),
            predicate: predicate.clone(),
            object: rest,
        })
    }

    fn process_element(
        &mut self,
        element: D::Handle,
        eval: &EvaluationContext,
    ) -> Result<(), Interrupt> {
        let mark = self.scope.mark();
        let result = self.element_walk(element, eval);
        self.scope.restore(mark);
        result
    }

    fn element_walk(
        &mut self,
        element: D::Handle,
        eval: &EvaluationContext,
    ) -> Result<(), Interrupt> {
        let mut base_iri = eval.base_iri.clone();
        let mut language = eval.language.clone();
        let mut language_set = false;
        let mut parent_subject = eval.parent_subject.clone();
        let mut local_vocabulary = eval.local_vocabulary.clone();

        let mut rel = false;
        let mut rev = false;
        let mut about = false;
        let mut src = false;
        let mut href = false;
        let mut inlist = false;
        let mut resource = false;
        let mut has_typeof = false;
        let mut content = false;
        let mut datatype = false;
        let mut property = false;

        for (name, value) in self.document.attributes(element) {
            if let Some(prefix) = name.strip_prefix("xmlns:") {
                // xmlns resolution is document-relative, independent of
                // any declared base, and gets a '#' appended when the IRI
                // ends in neither '/' nor '#'
                if let Some(iri) = self.resolve_namespace_iri(&value, base_iri.as_ref()) {
                    if !self.handler.handle_namespace(prefix, &iri) {
                        return Err(Interrupt::Stop);
                    }
                    self.scope.bind(prefix, &iri);
                }
                continue;
            }
            match name.as_str() {
                // @lang and @xml:lang have the same effect, first one wins
                "xml:lang" | "lang" => {
                    if !language_set {
                        language = value.clone();
                        language_set = true;
                    }
                }
                "xml:base" => {
                    if self.xml_base_allowed {
                        if let Some(new_base) = self.resolve_base(&value, base_iri.as_ref()) {
                            let base_node = Subject::from(NamedNode {
                                iri: new_base.as_str().to_owned(),
                            });
                            let replaces_subject = match (&parent_subject, &base_iri) {
                                (None, _) => true,
                                (Some(Subject::NamedNode(node)), Some(old)) => {
                                    node.iri == old.as_str()
                                }
                                _ => false,
                            };
                            if replaces_subject {
                                parent_subject = Some(base_node);
                            }
                            base_iri = Some(new_base);
                        }
                    }
                }
                "prefix" => {
                    if self.version == RdfaSyntax::Rdfa10 {
                        self.warn("cannot use the @prefix attribute to define prefixes in RDFa 1.0");
                    } else {
                        self.parse_prefix_attribute(&value, base_iri.as_ref())?;
                    }
                }
                "profile" => {
                    if self.version == RdfaSyntax::Rdfa10 {
                        self.warn("cannot use the @profile attribute in RDFa 1.0");
                    } else if !self.apply_profiles(
                        &value,
                        base_iri.as_ref(),
                        &mut local_vocabulary,
                    )? {
                        // an unresolvable profile drops the whole subtree
                        return Ok(());
                    }
                }
                "vocab" => {
                    if self.version == RdfaSyntax::Rdfa10 {
                        self.warn("cannot use the @vocab attribute in RDFa 1.0");
                    } else if value.is_empty() {
                        local_vocabulary = XHTML_VOCABULARY.clone();
                    } else if let Some(vocabulary) = self.resolve_iri(&value, base_iri.as_ref()) {
                        local_vocabulary.set_vocabulary_iri(&vocabulary.iri);
                        if let Some(base) = &base_iri {
                            self.emit(Triple {
                                subject: NamedNode {
                                    iri: base.as_str().to_owned(),
                                }
                                .into(),
                                predicate: NamedNode {
                                    iri: RDFA_USES_VOCABULARY.to_owned(),
                                },
                                object: vocabulary.into(),
                            })?;
                        }
                    }
                }
                "rel" => rel = true,
                "rev" => rev = true,
                "about" => about = true,
                "src" => src = true,
                "href" => href = true,
                "inlist" => inlist = true,
                "resource" => resource = true,
                "typeof" => has_typeof = true,
                "content" => content = true,
                "datatype" => datatype = true,
                "property" => property = true,
                _ => {}
            }
        }

        let rel_nodes = if rel {
            self.attribute_nodes(element, "rel", base_iri.as_ref(), &local_vocabulary)
        } else {
            Vec::new()
        };
        let rev_nodes = if rev {
            self.attribute_nodes(element, "rev", base_iri.as_ref(), &local_vocabulary)
        } else {
            Vec::new()
        };
        // with @property present, a @rel/@rev whose values all fail to
        // resolve is treated as absent
        if property && rel && rel_nodes.is_empty() {
            rel = false;
        }
        if property && rev && rev_nodes.is_empty() {
            rev = false;
        }

        let about_value = self
            .document
            .attribute(element, "about")
            .filter(|value| value != "[]");
        let about = about && about_value.is_some();
        let resource_value = self
            .document
            .attribute(element, "resource")
            .filter(|value| value != "[]");
        let resource = resource && resource_value.is_some();
        let element_name = self.document.element_name(element);
        let head_or_body = element_name == "head" || element_name == "body";
        let is_root = self.document.is_root(element);

        let mut new_subject: Option<Subject> = None;
        let mut explicit_subject = false;
        let mut current_object: Option<Subject> = None;
        let mut typed_resource: Option<Subject> = None;
        let mut skip = false;

        if !rel && !rev {
            if property && !content && !datatype {
                // the bare-@property form: @resource and friends feed the
                // property value, not the subject
                if about {
                    new_subject = self.resolve_node_reference(
                        about_value.as_deref(),
                        base_iri.as_ref(),
                        &local_vocabulary,
                    );
                    explicit_subject = new_subject.is_some();
                } else if head_or_body {
                    new_subject = eval.parent_object.clone();
                } else if is_root {
                    new_subject = self.base_subject(base_iri.as_ref());
                    explicit_subject = new_subject.is_some();
                } else {
                    new_subject = eval.parent_object.clone();
                }
                if has_typeof {
                    if about {
                        typed_resource = new_subject.clone();
                    } else {
                        let derived = if resource {
                            self.resolve_node_reference(
                                resource_value.as_deref(),
                                base_iri.as_ref(),
                                &local_vocabulary,
                            )
                        } else if href || src {
                            self.link_subject(element, href, base_iri.as_ref())
                        } else {
                            Some(self.fresh_blank_node().into())
                        };
                        typed_resource = derived.clone();
                        current_object = derived;
                    }
                }
            } else {
                if about {
                    new_subject = self.resolve_node_reference(
                        about_value.as_deref(),
                        base_iri.as_ref(),
                        &local_vocabulary,
                    );
                    explicit_subject = new_subject.is_some();
                } else if resource {
                    new_subject = self.resolve_node_reference(
                        resource_value.as_deref(),
                        base_iri.as_ref(),
                        &local_vocabulary,
                    );
                    explicit_subject = new_subject.is_some();
                } else if href || src {
                    new_subject = self.link_subject(element, href, base_iri.as_ref());
                    explicit_subject = new_subject.is_some();
                } else if head_or_body {
                    new_subject = eval.parent_object.clone();
                } else if is_root {
                    new_subject = self.base_subject(base_iri.as_ref());
                    explicit_subject = new_subject.is_some();
                } else if has_typeof {
                    new_subject = Some(self.fresh_blank_node().into());
                    explicit_subject = true;
                } else {
                    new_subject = eval.parent_object.clone();
                    if !property {
                        skip = true;
                    }
                }
                if has_typeof {
                    typed_resource = new_subject.clone();
                }
            }
        } else {
            if about {
                new_subject = self.resolve_node_reference(
                    about_value.as_deref(),
                    base_iri.as_ref(),
                    &local_vocabulary,
                );
                explicit_subject = new_subject.is_some();
            } else if head_or_body {
                new_subject = eval.parent_object.clone();
            } else if is_root {
                new_subject = self.base_subject(base_iri.as_ref());
                explicit_subject = new_subject.is_some();
            } else {
                new_subject = eval.parent_object.clone();
            }
            if resource {
                current_object = self.resolve_node_reference(
                    resource_value.as_deref(),
                    base_iri.as_ref(),
                    &local_vocabulary,
                );
            } else if href || src {
                current_object = self.link_subject(element, href, base_iri.as_ref());
            }
            if has_typeof {
                if about {
                    typed_resource = new_subject.clone();
                } else {
                    if current_object.is_none() {
                        current_object = Some(self.fresh_blank_node().into());
                    }
                    typed_resource = current_object.clone();
                }
            }
        }

        // rdf:type triples attach to the typed resource
        if has_typeof {
            if let Some(target) = typed_resource.clone().or_else(|| new_subject.clone()) {
                let types =
                    self.attribute_nodes(element, "typeof", base_iri.as_ref(), &local_vocabulary);
                for type_node in types {
                    self.emit(Triple {
                        subject: target.clone(),
                        predicate: NamedNode {
                            iri: RDF_TYPE.to_owned(),
                        },
                        object: type_node,
                    })?;
                }
            }
        }

        // lists never span a subject change
        let list_mapping: ListMapping =
            if new_subject.is_some() && new_subject != eval.parent_subject {
                fresh_list_mapping()
            } else {
                Rc::clone(&eval.list_mapping)
            };

        let mut incomplete: Vec<IncompleteTriple> = Vec::new();
        if new_subject.is_some() && current_object.is_some() {
            if let (Some(subject), Some(object)) = (&new_subject, &current_object) {
                for predicate in &rel_nodes {
                    let predicate = match self.named_predicate(predicate, subject) {
                        Some(named) => named,
                        None => continue,
                    };
                    if inlist {
                        if explicit_subject {
                            self.emit_list(
                                subject,
                                &predicate,
                                &[Term::from(object.clone())],
                            )?;
                        } else {
                            list_mapping
                                .borrow_mut()
                                .entry(predicate)
                                .or_default()
                                .push(Term::from(object.clone()));
                        }
                    } else {
                        self.emit(Triple {
                            subject: subject.clone(),
                            predicate,
                            object: Term::from(object.clone()),
                        })?;
                    }
                }
                for predicate in &rev_nodes {
                    let predicate = match self.named_predicate(predicate, object) {
                        Some(named) => named,
                        None => continue,
                    };
                    self.emit(Triple {
                        subject: object.clone(),
                        predicate,
                        object: Term::from(subject.clone()),
                    })?;
                }
            }
        } else if !rel_nodes.is_empty() || !rev_nodes.is_empty() {
            // no object yet: record the triples as incomplete, a
            // descendant's subject completes them
            for predicate in &rel_nodes {
                let predicate = match predicate {
                    Term::NamedNode(named) => named.clone(),
                    _ => {
                        self.warn("ignoring a non-IRI @rel predicate");
                        continue;
                    }
                };
                if inlist {
                    list_mapping
                        .borrow_mut()
                        .entry(predicate.clone())
                        .or_default();
                    incomplete.push(IncompleteTriple::List(predicate));
                } else {
                    incomplete.push(IncompleteTriple::Forward(predicate));
                }
            }
            for predicate in &rev_nodes {
                match predicate {
                    Term::NamedNode(named) => {
                        incomplete.push(IncompleteTriple::Reverse(named.clone()))
                    }
                    _ => self.warn("ignoring a non-IRI @rev predicate"),
                }
            }
            if !incomplete.is_empty() {
                current_object = Some(self.fresh_blank_node().into());
            }
        }

        if property {
            if let Some(subject) = new_subject.clone() {
                if let Some(value) = self.property_value(
                    element,
                    base_iri.as_ref(),
                    &language,
                    &local_vocabulary,
                    PropertyFlags {
                        content,
                        datatype,
                        rel,
                        rev,
                        resource,
                        href,
                        src,
                        about,
                        has_typeof,
                    },
                    resource_value.as_deref(),
                    typed_resource.as_ref(),
                )? {
                    let predicates = self.attribute_nodes(
                        element,
                        "property",
                        base_iri.as_ref(),
                        &local_vocabulary,
                    );
                    for predicate in predicates {
                        let predicate = match predicate {
                            Term::NamedNode(named) => named,
                            _ => {
                                self.warn(&format!(
                                    "ignoring a blank node predicate for {}",
                                    subject
                                ));
                                continue;
                            }
                        };
                        if inlist {
                            list_mapping
                                .borrow_mut()
                                .entry(predicate)
                                .or_default()
                                .push(value.clone());
                        } else {
                            self.emit(Triple {
                                subject: subject.clone(),
                                predicate,
                                object: value.clone(),
                            })?;
                        }
                    }
                }
            }
        }

        // complete the triples the parent deferred to this subject
        if !skip && new_subject.is_some() {
            if let (Some(subject), Some(parent)) = (&new_subject, &parent_subject) {
                for entry in &eval.incomplete_triples {
                    match entry {
                        IncompleteTriple::List(predicate) => {
                            eval.list_mapping
                                .borrow_mut()
                                .entry(predicate.clone())
                                .or_default()
                                .push(Term::from(subject.clone()));
                        }
                        IncompleteTriple::Forward(predicate) => {
                            self.emit(Triple {
                                subject: parent.clone(),
                                predicate: predicate.clone(),
                                object: Term::from(subject.clone()),
                            })?;
                        }
                        IncompleteTriple::Reverse(predicate) => {
                            self.emit(Triple {
                                subject: subject.clone(),
                                predicate: predicate.clone(),
                                object: Term::from(parent.clone()),
                            })?;
                        }
                    }
                }
            }
        }

        let child_eval = if skip {
            let mut context = eval.clone();
            context.language = language.clone();
            context.local_vocabulary = local_vocabulary.clone();
            context
        } else {
            EvaluationContext {
                base_iri: base_iri.clone(),
                language: language.clone(),
                parent_subject: new_subject.clone().or_else(|| parent_subject.clone()),
                parent_object: current_object
                    .clone()
                    .or_else(|| new_subject.clone())
                    .or_else(|| parent_subject.clone()),
                incomplete_triples: incomplete,
                list_mapping: Rc::clone(&list_mapping),
                local_vocabulary: local_vocabulary.clone(),
            }
        };
        for child in self.document.children(element) {
            if self.document.is_element(child) {
                self.process_element(child, &child_eval)?;
            }
        }

        // flush the lists this element owns
        if !Rc::ptr_eq(&list_mapping, &eval.list_mapping) {
            if let Some(subject) = &new_subject {
                let entries: Vec<(NamedNode, Vec<Term>)> = list_mapping
                    .borrow()
                    .iter()
                    .map(|(predicate, members)| (predicate.clone(), members.clone()))
                    .collect();
                for (predicate, members) in entries {
                    self.emit_list(subject, &predicate, &members)?;
                }
            }
        }

        Ok(())
    }

    /// The property value priority chain: explicit datatype, then
    /// `@content`, then `@datetime`, then a resource value, then the
    /// typed resource, then the text content.
    #[allow(clippy::too_many_arguments)]
    fn property_value(
        &mut self,
        element: D::Handle,
        base_iri: Option<&Iri<String>>,
        language: &str,
        vocabulary: &TermMappings,
        flags: PropertyFlags,
        resource_value: Option<&str>,
        typed_resource: Option<&Subject>,
    ) -> Result<Option<Term>, Interrupt> {
        let mut datatype_node: Option<NamedNode> = None;
        if flags.datatype {
            let value = self
                .document
                .attribute(element, "datatype")
                .unwrap_or_default();
            if !value.is_empty() {
                match self.resolve_term_curie_or_iri(&value, base_iri, vocabulary) {
                    Some(Term::NamedNode(named)) => datatype_node = Some(named),
                    Some(_) => return Err(RdfaError::non_iri_datatype(&value).into()),
                    None => self.warn(&format!(
                        "unable to resolve a valid datatype from '{}' - assuming a plain literal",
                        value
                    )),
                }
            }
        }

        if let Some(datatype) = datatype_node {
            if datatype.iri == RDF_XML_LITERAL {
                self.serialize_xml_literal(element, language)?;
                return Ok(Some(
                    Literal::Typed {
                        value: self.document.inner_markup(element),
                        datatype,
                    }
                    .into(),
                ));
            }
            if datatype.iri == RDFA_JSON {
                return Ok(Some(
                    Literal::Typed {
                        value: self.document.inner_markup(element),
                        datatype,
                    }
                    .into(),
                ));
            }
            let value = match self.document.attribute(element, "content") {
                Some(content) => content,
                None => decode_entities(&self.document.inner_text(element)),
            };
            return Ok(Some(Literal::Typed { value, datatype }.into()));
        }

        if flags.content {
            let value = self
                .document
                .attribute(element, "content")
                .unwrap_or_default();
            return Ok(Some(plain_literal(value, language)));
        }

        if self.version != RdfaSyntax::Rdfa10 {
            let datetime = self.document.attribute(element, "datetime");
            let is_time_element = self.document.element_name(element) == "time";
            if let Some(value) = datetime.or_else(|| {
                if is_time_element {
                    Some(self.document.inner_text(element))
                } else {
                    None
                }
            }) {
                for (pattern, datatype) in DATETIME_TYPES.iter() {
                    if pattern.is_match(&value) {
                        return Ok(Some(
                            Literal::Typed {
                                value,
                                datatype: NamedNode {
                                    iri: (*datatype).to_owned(),
                                },
                            }
                            .into(),
                        ));
                    }
                }
                return Ok(Some(plain_literal(value, language)));
            }
        }

        if (flags.resource || flags.href || flags.src) && !flags.rel && !flags.rev {
            let value = if flags.resource {
                self.resolve_node_reference(resource_value, base_iri, vocabulary)
            } else {
                self.link_subject(element, flags.href, base_iri)
            };
            return Ok(value.map(Term::from));
        }

        if flags.has_typeof && !flags.about {
            if let Some(typed) = typed_resource {
                return Ok(Some(Term::from(typed.clone())));
            }
        }

        let children = self.document.children(element);
        if children.is_empty() || children.iter().all(|child| self.document.is_text(*child)) {
            return Ok(Some(plain_literal(
                decode_entities(&self.document.inner_text(element)),
                language,
            )));
        }
        if self.version == RdfaSyntax::Rdfa10 {
            // mixed content is an XML literal under RDFa 1.0
            self.serialize_xml_literal(element, language)?;
            return Ok(Some(
                Literal::Typed {
                    value: self.document.inner_markup(element),
                    datatype: NamedNode {
                        iri: RDF_XML_LITERAL.to_owned(),
                    },
                }
                .into(),
            ));
        }
        Ok(Some(plain_literal(
            decode_entities(&self.document.inner_text(element)),
            language,
        )))
    }

    /// Prepares an element's children for XML-literal capture, pushing the
    /// in-scope namespace declarations and language down into the markup.
    fn serialize_xml_literal(
        &mut self,
        element: D::Handle,
        language: &str,
    ) -> Result<(), Interrupt> {
        let children = self.document.children(element);
        for child in children {
            if self.document.is_element(child) {
                self.propagate_xml_namespaces(child, language, false)?;
            }
        }
        Ok(())
    }

    fn propagate_xml_namespaces(
        &mut self,
        element: D::Handle,
        language: &str,
        mut no_default_namespace: bool,
    ) -> Result<(), Interrupt> {
        if self.document.has_attribute(element, "xmlns") {
            no_default_namespace = true;
        } else if !no_default_namespace {
            self.document
                .set_attribute(element, "xmlns", XHTML_NAMESPACE);
        }

        let name = self.document.element_name(element);
        if let Some(colon) = name.find(':') {
            let prefix = name[..colon].to_owned();
            let declaration = format!("xmlns:{}", prefix);
            if !self.document.has_attribute(element, &declaration) {
                match self.scope.get(&prefix) {
                    Some(iri) => {
                        let iri = iri.to_owned();
                        self.document.set_attribute(element, &declaration, &iri);
                    }
                    None => return Err(RdfaError::undefined_xml_namespace(&prefix).into()),
                }
            }
        }

        if !language.is_empty() && !self.document.has_attribute(element, "xml:lang") {
            self.document.set_attribute(element, "xml:lang", language);
        }

        let bindings: Vec<(String, String)> = self
            .scope
            .iter()
            .filter(|(prefix, _)| !prefix.is_empty())
            .map(|(prefix, iri)| (prefix.to_owned(), iri.to_owned()))
            .collect();
        for (prefix, iri) in bindings {
            let declaration = format!("xmlns:{}", prefix);
            if !self.document.has_attribute(element, &declaration) {
                self.document.set_attribute(element, &declaration, &iri);
            }
        }

        let children = self.document.children(element);
        for child in children {
            if self.document.is_element(child) {
                self.propagate_xml_namespaces(child, language, no_default_namespace)?;
            }
        }
        Ok(())
    }

    fn parse_prefix_attribute(
        &mut self,
        value: &str,
        base_iri: Option<&Iri<String>>,
    ) -> Result<(), Interrupt> {
        if value.is_empty() {
            return Ok(());
        }
        let mut matched = false;
        for capture in PREFIX_ATTRIBUTE.captures_iter(value) {
            matched = true;
            let prefix = &capture["prefix"];
            if prefix.is_empty() {
                self.warn("ignoring an empty prefix mapping in a @prefix attribute");
                return Ok(());
            }
            if let Some(iri) = self.resolve_iri(&capture["url"], base_iri) {
                if !self.handler.handle_namespace(prefix, &iri.iri) {
                    return Err(Interrupt::Stop);
                }
                self.scope.bind(prefix, &iri.iri);
            }
        }
        if !matched && !value.trim().is_empty() {
            self.warn(&format!("failed to parse the @prefix attribute '{}'", value));
        }
        Ok(())
    }

    /// Merges every listed profile into the local vocabulary and scope.
    /// Returns `false` when a profile cannot be resolved, which drops the
    /// element's subtree.
    fn apply_profiles(
        &mut self,
        value: &str,
        base_iri: Option<&Iri<String>>,
        vocabulary: &mut TermMappings,
    ) -> Result<bool, Interrupt> {
        for profile_iri in value.split_whitespace() {
            if profile_iri == XHTML_VOCAB_NAMESPACE
                || profile_iri == XHTML_VOCAB_NAMESPACE.trim_end_matches('#')
            {
                vocabulary.merge(&XHTML_VOCABULARY);
                continue;
            }
            match self.profile_loader.load(profile_iri) {
                Some(Profile { namespaces, terms }) => {
                    for (prefix, iri) in namespaces {
                        if let Some(resolved) = self.resolve_iri(&iri, base_iri) {
                            vocabulary.add_namespace(&prefix, &resolved.iri);
                            if !self.handler.handle_namespace(&prefix, &resolved.iri) {
                                return Err(Interrupt::Stop);
                            }
                            self.scope.bind(&prefix, &resolved.iri);
                        }
                    }
                    for (term, iri) in terms {
                        vocabulary.add_term(&term, &iri);
                    }
                }
                None => {
                    self.warn(&format!(
                        "unable to retrieve a profile document from '{}' - ignoring this subtree",
                        profile_iri
                    ));
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn named_predicate(&mut self, term: &Term, subject: &Subject) -> Option<NamedNode> {
        match term {
            Term::NamedNode(named) => Some(named.clone()),
            _ => {
                self.warn(&format!("ignoring a non-IRI predicate for {}", subject));
                None
            }
        }
    }

    // @href resolves as a plain IRI reference, never a CURIE
    fn link_subject(
        &mut self,
        element: D::Handle,
        href: bool,
        base_iri: Option<&Iri<String>>,
    ) -> Option<Subject> {
        let value = self
            .document
            .attribute(element, if href { "href" } else { "src" })?;
        self.resolve_iri(&value, base_iri).map(Subject::from)
    }

    fn base_subject(&mut self, base_iri: Option<&Iri<String>>) -> Option<Subject> {
        match base_iri {
            Some(base) => Some(
                NamedNode {
                    iri: base.as_str().to_owned(),
                }
                .into(),
            ),
            None => {
                self.warn(
                    "unable to generate a subject from the base IRI since there is no in-scope base IRI",
                );
                None
            }
        }
    }

    /// `@about`/`@resource`: a safe-CURIE, CURIE or IRI reference.
    fn resolve_node_reference(
        &mut self,
        value: Option<&str>,
        base_iri: Option<&Iri<String>>,
        vocabulary: &TermMappings,
    ) -> Option<Subject> {
        let value = value?;
        let term = if value.starts_with('[') && value.ends_with(']') {
            self.resolve_curie(&value[1..value.len() - 1], vocabulary)
        } else if is_blank_node(value) {
            Some(blank_node_reference(value).into())
        } else if self.is_curie(value, vocabulary) {
            self.resolve_curie(value, vocabulary)
        } else {
            self.resolve_iri(value, base_iri).map(Term::from)
        };
        match term {
            Some(Term::NamedNode(named)) => Some(named.into()),
            Some(Term::BlankNode(blank)) => Some(blank.into()),
            _ => None,
        }
    }

    fn resolve_iri(
        &mut self,
        value: &str,
        base_iri: Option<&Iri<String>>,
    ) -> Option<NamedNode> {
        let resolved = match base_iri {
            Some(base) => base.resolve(value),
            None => Iri::parse(value.to_owned()),
        };
        match resolved {
            Ok(iri) => Some(NamedNode {
                iri: iri.into_inner(),
            }),
            Err(_) => {
                self.warn(&format!("unable to resolve '{}' into an IRI", value));
                None
            }
        }
    }

    fn resolve_base(
        &mut self,
        value: &str,
        base_iri: Option<&Iri<String>>,
    ) -> Option<Iri<String>> {
        let resolved = match base_iri {
            Some(base) => base.resolve(value),
            None => Iri::parse(value.to_owned()),
        };
        match resolved {
            Ok(iri) => Some(iri),
            Err(_) => {
                self.warn(&format!("ignoring the invalid xml:base value '{}'", value));
                None
            }
        }
    }

    fn resolve_namespace_iri(
        &mut self,
        value: &str,
        base_iri: Option<&Iri<String>>,
    ) -> Option<String> {
        let resolved = self.resolve_iri(value, base_iri)?;
        let mut iri = resolved.iri;
        if !iri.ends_with('/') && !iri.ends_with('#') {
            iri.push('#');
        }
        Some(iri)
    }

    fn is_curie(&self, value: &str, vocabulary: &TermMappings) -> bool {
        if let Some(rest) = value.strip_prefix(':') {
            return !rest.is_empty() && self.scope.contains("");
        }
        match value.find(':') {
            Some(colon) => {
                let prefix = &value[..colon];
                (is_ncname(prefix) || prefix == "_")
                    && (self.scope.contains(prefix) || vocabulary.namespace(prefix).is_some())
            }
            None => false,
        }
    }

    fn resolve_curie(&mut self, value: &str, vocabulary: &TermMappings) -> Option<Term> {
        if let Some(id) = value.strip_prefix("_:") {
            return Some(
                BlankNode {
                    id: if id.is_empty() { "_".to_owned() } else { id.to_owned() },
                }
                .into(),
            );
        }
        if self.version == RdfaSyntax::Rdfa10 {
            if let Some(rest) = value.strip_prefix(':') {
                return Some(
                    NamedNode {
                        iri: format!("{}{}", XHTML_VOCAB_NAMESPACE, rest),
                    }
                    .into(),
                );
            }
        }
        let colon = match value.find(':') {
            Some(colon) => colon,
            None => {
                self.warn(&format!(
                    "the value '{}' is not valid as a CURIE as it has no prefix",
                    value
                ));
                return None;
            }
        };
        let (prefix, suffix) = (&value[..colon], &value[colon + 1..]);
        let namespace = self
            .scope
            .get(prefix)
            .map(str::to_owned)
            .or_else(|| vocabulary.namespace(prefix).map(str::to_owned));
        match namespace {
            Some(namespace) => Some(
                NamedNode {
                    iri: format!("{}{}", namespace, suffix),
                }
                .into(),
            ),
            None => {
                self.warn(&format!(
                    "could not resolve the CURIE '{}': the prefix '{}' is not bound",
                    value, prefix
                ));
                None
            }
        }
    }

    fn resolve_term(&mut self, term: &str, vocabulary: &TermMappings) -> Option<Term> {
        if self.version == RdfaSyntax::Rdfa10 {
            // RDFa 1.0 bare terms come only from the fixed XHTML vocabulary
            return match XHTML_VOCABULARY.resolve_term(term) {
                Some(iri) => Some(NamedNode { iri }.into()),
                None => {
                    self.warn(&format!(
                        "cannot use the unprefixed term '{}' in RDFa 1.0 - only reserved XHTML terms are permitted",
                        term
                    ));
                    None
                }
            };
        }
        if vocabulary.has_term(term) || !vocabulary.vocabulary_iri().is_empty() {
            return vocabulary
                .resolve_term(term)
                .map(|iri| NamedNode { iri }.into());
        }
        if let Some(iri) = XHTML_VOCABULARY.resolve_term(term) {
            return Some(NamedNode { iri }.into());
        }
        self.warn(&format!(
            "unable to resolve the term '{}' since no vocabulary is in scope",
            term
        ));
        None
    }

    /// Terms, CURIEs and absolute IRIs, the value space of `@datatype`,
    /// `@typeof`, `@rel`, `@rev` and `@property` entries.
    fn resolve_term_curie_or_iri(
        &mut self,
        value: &str,
        _base_iri: Option<&Iri<String>>,
        vocabulary: &TermMappings,
    ) -> Option<Term> {
        if is_ncname(value) {
            return self.resolve_term(value, vocabulary);
        }
        if is_blank_node(value) {
            return Some(blank_node_reference(value).into());
        }
        if let Some(rest) = value.strip_prefix(':') {
            if self.version != RdfaSyntax::Rdfa10 {
                return self.resolve_term(rest, vocabulary);
            }
            return self.resolve_curie(value, vocabulary);
        }
        if self.is_curie(value, vocabulary) {
            return self.resolve_curie(value, vocabulary);
        }
        match Iri::parse(value.to_owned()) {
            Ok(iri) => Some(
                NamedNode {
                    iri: iri.into_inner(),
                }
                .into(),
            ),
            Err(_) => {
                self.warn(&format!(
                    "ignoring the value '{}' since it is not a valid term, CURIE or absolute IRI",
                    value
                ));
                None
            }
        }
    }

    fn attribute_nodes(
        &mut self,
        element: D::Handle,
        attribute: &str,
        base_iri: Option<&Iri<String>>,
        vocabulary: &TermMappings,
    ) -> Vec<Term> {
        let value = match self.document.attribute(element, attribute) {
            Some(value) => value,
            None => return Vec::new(),
        };
        let mut nodes = Vec::new();
        for token in value.split_whitespace() {
            if let Some(node) = self.resolve_term_curie_or_iri(token, base_iri, vocabulary) {
                nodes.push(node);
            }
        }
        nodes
    }
}

#[derive(Clone, Copy)]
struct PropertyFlags {
    content: bool,
    datatype: bool,
    rel: bool,
    rev: bool,
    resource: bool,
    href: bool,
    src: bool,
    about: bool,
    has_typeof: bool,
}

fn plain_literal(value: String, language: &str) -> Term {
    if language.is_empty() {
        Literal::Simple { value }.into()
    } else {
        Literal::LanguageTaggedString {
            value,
            language: language.to_owned(),
        }
        .into()
    }
}

fn is_blank_node(value: &str) -> bool {
    value.starts_with("_:")
}

fn blank_node_reference(value: &str) -> BlankNode {
    let id = &value[2..];
    BlankNode {
        id: if id.is_empty() { "_".to_owned() } else { id.to_owned() },
    }
}

fn is_ncname(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Decodes the named and numeric character references that appear in
/// attribute values and text content.
fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            Some(end) => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push_str(&decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    match entity {
        "amp" => Some("&".to_owned()),
        "lt" => Some("<".to_owned()),
        "gt" => Some(">".to_owned()),
        "quot" => Some("\"".to_owned()),
        "apos" => Some("'".to_owned()),
        "nbsp" => Some("\u{a0}".to_owned()),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code).map(|c| c.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_decoding() {
        assert_eq!("a<b>&c", decode_entities("a&lt;b&gt;&amp;c"));
        assert_eq!("A B", decode_entities("A&#x20;B"));
        assert_eq!("A B", decode_entities("A&#32;B"));
        assert_eq!("&unknown; stays", decode_entities("&unknown; stays"));
        assert_eq!("dangling &", decode_entities("dangling &"));
    }

    #[test]
    fn datetime_cascade_picks_the_most_specific_type() {
        let cases = [
            ("P3Y6M4DT12H30M5S", XSD_DURATION),
            ("2026-08-30T10:00:00Z", XSD_DATE_TIME),
            ("2026-08-30", XSD_DATE),
            ("10:00:00", XSD_TIME),
            ("2026-08", XSD_G_YEAR_MONTH),
            ("2026", XSD_G_YEAR),
        ];
        for (value, expected) in cases {
            let found = DATETIME_TYPES
                .iter()
                .find(|(pattern, _)| pattern.is_match(value))
                .map(|(_, datatype)| *datatype);
            assert_eq!(Some(expected), found, "for {}", value);
        }
        assert!(!DATETIME_TYPES.iter().any(|(p, _)| p.is_match("not a date")));
    }

    #[test]
    fn ncname_predicate() {
        assert!(is_ncname("license"));
        assert!(is_ncname("_x-1.a"));
        assert!(!is_ncname("a:b"));
        assert!(!is_ncname("1abc"));
        assert!(!is_ncname(""));
    }
}
