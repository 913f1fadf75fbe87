//! Token-keyed observable collection of structured elements.
//!
//! Each element is addressed by an [`ElementToken`] issued from a
//! per-collection counter. Tokens are strictly increasing and never reused,
//! so iterating in token order is iterating in insertion order.
//!
//! # Lifecycle Events
//!
//! - `add` builds the element, runs the caller's initializer, inserts it and
//!   only then fires [`ObservableCollection::on_element_added`], so
//!   subscribers always observe a fully initialized element.
//! - `remove` fires [`ObservableCollection::on_element_removing`] while the
//!   element is still reachable through [`ObservableCollection::get`], then
//!   erases it.
//!
//! Unknown tokens are reported as [`DataHubError::UnknownToken`]; neither
//! lookup nor removal ever invents or announces an element that does not
//! exist, unless the collection opted into
//! [`MissingElementPolicy::CreateOnDemand`] and the caller asks through
//! [`ObservableCollection::get_or_create`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::config::HubConfig;
use crate::error::{DataHubError, Result};
use crate::event::EventHandler;
use crate::token::ElementToken;

/// What [`ObservableCollection::get_or_create`] does for a token with no element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MissingElementPolicy {
    /// Report [`DataHubError::UnknownToken`].
    #[default]
    Fail,
    /// Insert a freshly built element under the requested token.
    CreateOnDemand,
}

/// Payload of [`ObservableCollection::on_element_added`].
pub struct ElementAdded<E> {
    pub token: ElementToken,
    pub element: Rc<E>,
}

impl<E> fmt::Debug for ElementAdded<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementAdded")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Open-ended set of elements, each addressable by a stable token.
pub struct ObservableCollection<E> {
    elements: RefCell<BTreeMap<ElementToken, Rc<E>>>,
    last_issued: Cell<ElementToken>,
    /// Tokens whose removing event is being dispatched.
    removing: RefCell<BTreeSet<ElementToken>>,
    factory: Box<dyn Fn() -> E>,
    policy: MissingElementPolicy,
    /// Fired after an element has been initialized and inserted.
    pub on_element_added: EventHandler<ElementAdded<E>>,
    /// Fired before an element is erased, while it is still reachable.
    pub on_element_removing: EventHandler<ElementToken>,
}

impl<E: Default + 'static> ObservableCollection<E> {
    /// Creates an empty collection whose elements start as `E::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(E::default)
    }
}

impl<E: Default + 'static> Default for ObservableCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ObservableCollection<E> {
    /// Creates an empty collection whose elements are built by `factory`.
    pub fn with_factory(factory: impl Fn() -> E + 'static) -> Self {
        Self {
            elements: RefCell::new(BTreeMap::new()),
            last_issued: Cell::new(ElementToken::from_raw(HubConfig::FIRST_TOKEN - 1)),
            removing: RefCell::new(BTreeSet::new()),
            factory: Box::new(factory),
            policy: MissingElementPolicy::default(),
            on_element_added: EventHandler::new(),
            on_element_removing: EventHandler::new(),
        }
    }

    /// Sets how [`Self::get_or_create`] treats tokens with no element.
    #[must_use]
    pub fn with_policy(mut self, policy: MissingElementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Policy applied by [`Self::get_or_create`].
    pub fn policy(&self) -> MissingElementPolicy {
        self.policy
    }

    /// Builds a new element, lets `initializer` populate it, inserts it and
    /// announces it. Returns the element's token.
    pub fn add(&self, initializer: impl FnOnce(&mut E)) -> ElementToken {
        let token = self.last_issued.get().next();
        self.last_issued.set(token);

        let mut element = (self.factory)();
        initializer(&mut element);
        self.insert(token, element);
        token
    }

    /// Announces and then erases the element under `token`.
    ///
    /// Returns the erased element. An unknown token fires nothing, and so
    /// does a nested `remove` of an element whose removal is already being
    /// announced: the outer call erases it.
    pub fn remove(&self, token: ElementToken) -> Result<Rc<E>> {
        if !self.contains(token) || self.removing.borrow().contains(&token) {
            tracing::warn!(%token, "remove of unknown element token");
            return Err(DataHubError::UnknownToken { token });
        }

        self.removing.borrow_mut().insert(token);
        self.on_element_removing.dispatch(&token);
        self.removing.borrow_mut().remove(&token);

        let removed = self
            .elements
            .borrow_mut()
            .remove(&token)
            .ok_or(DataHubError::UnknownToken { token })?;
        tracing::debug!(%token, remaining = self.len(), "element removed");
        Ok(removed)
    }

    /// Returns the live element under `token`.
    pub fn get(&self, token: ElementToken) -> Result<Rc<E>> {
        self.elements
            .borrow()
            .get(&token)
            .cloned()
            .ok_or(DataHubError::UnknownToken { token })
    }

    /// Returns the element under `token`, building one if the collection's
    /// policy is [`MissingElementPolicy::CreateOnDemand`].
    ///
    /// A created element is announced through `on_element_added`, and the
    /// token counter moves past `token` so later `add` calls stay unique.
    /// The unassigned sentinel never addresses an element, and tokens above
    /// [`HubConfig::MAX_REQUESTED_TOKEN`] are never created.
    pub fn get_or_create(&self, token: ElementToken) -> Result<Rc<E>> {
        if token.is_unassigned() {
            return Err(DataHubError::UnassignedToken);
        }
        match (self.get(token), self.policy) {
            (Ok(element), _) => Ok(element),
            (Err(err), MissingElementPolicy::Fail) => Err(err),
            (Err(_), MissingElementPolicy::CreateOnDemand) => {
                if token.get() > HubConfig::MAX_REQUESTED_TOKEN {
                    tracing::warn!(%token, "refusing to create element beyond the token range");
                    return Err(DataHubError::TokenOutOfRange { token });
                }
                if token > self.last_issued.get() {
                    self.last_issued.set(token);
                }
                let element = self.insert(token, (self.factory)());
                Ok(element)
            }
        }
    }

    /// Returns true if an element lives under `token`.
    pub fn contains(&self, token: ElementToken) -> bool {
        self.elements.borrow().contains_key(&token)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Tokens of every live element, in insertion order.
    pub fn tokens(&self) -> Vec<ElementToken> {
        self.elements.borrow().keys().copied().collect()
    }

    /// Visits every live element once, in insertion order.
    ///
    /// The visit runs over a snapshot taken when the call starts: elements
    /// added by the visitor are not visited, and elements it removes are
    /// still visited.
    pub fn for_each(&self, mut visitor: impl FnMut(ElementToken, &E)) {
        let snapshot: Vec<(ElementToken, Rc<E>)> = self
            .elements
            .borrow()
            .iter()
            .map(|(token, element)| (*token, Rc::clone(element)))
            .collect();
        for (token, element) in &snapshot {
            visitor(*token, element);
        }
    }

    /// Removes every element, announcing each removal in insertion order.
    pub fn clear(&self) {
        for token in self.tokens() {
            // Ignore elements a subscriber already removed.
            let _ = self.remove(token);
        }
    }

    fn insert(&self, token: ElementToken, element: E) -> Rc<E> {
        let element = Rc::new(element);
        self.elements
            .borrow_mut()
            .insert(token, Rc::clone(&element));
        tracing::debug!(%token, live = self.len(), "element added");

        self.on_element_added.dispatch(&ElementAdded {
            token,
            element: Rc::clone(&element),
        });
        element
    }
}

impl<E> fmt::Debug for ObservableCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCollection")
            .field("len", &self.len())
            .field("last_issued", &self.last_issued.get())
            .field("policy", &self.policy)
            .finish()
    }
}
