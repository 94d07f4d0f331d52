//! Tag index over a service registry

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::cmp::Reverse;
use tracing::debug;

use crate::error::{fail, DiError, DiResult};
use crate::registry::{ServiceLocator, TagRegistry};
use crate::service::Instance;

#[derive(Debug, Clone)]
struct TagMember {
    id: String,
    priority: i32,
}

/// Groups service ids by tag with a priority per member.
///
/// Members of a tag are resolved through the wrapped locator in descending
/// priority; members with equal priority keep their tagging order.
pub struct TaggedContainer<L> {
    locator: L,
    tags: RefCell<FxHashMap<String, Vec<TagMember>>>,
}

impl<L: ServiceLocator> TaggedContainer<L> {
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            tags: RefCell::new(FxHashMap::default()),
        }
    }

    /// The registry members are resolved through
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Tag a service, failing when it already carries the tag
    pub fn tag_service(&self, id: &str, tag: &str, priority: i32) -> DiResult<()> {
        let mut tags = self.tags.borrow_mut();
        let members = tags.entry(tag.to_string()).or_default();
        if members.iter().any(|member| member.id == id) {
            return Err(DiError::AlreadyTagged {
                id: id.to_string(),
                tag: tag.to_string(),
            });
        }

        debug!("Tagged service {} as {} ({})", id, tag, priority);
        members.push(TagMember {
            id: id.to_string(),
            priority,
        });
        Ok(())
    }

    /// Tag a service or update the priority of an existing member
    pub fn override_tag_service(&self, id: &str, tag: &str, priority: i32) {
        let mut tags = self.tags.borrow_mut();
        let members = tags.entry(tag.to_string()).or_default();
        match members.iter_mut().find(|member| member.id == id) {
            Some(member) => member.priority = priority,
            None => members.push(TagMember {
                id: id.to_string(),
                priority,
            }),
        }
        debug!("Overrode tag {} on service {} ({})", tag, id, priority);
    }

    pub fn is_tagged_by(&self, id: &str, tag: &str) -> bool {
        self.tags
            .borrow()
            .get(tag)
            .is_some_and(|members| members.iter().any(|member| member.id == id))
    }

    /// Ids carrying `tag`, highest priority first
    pub fn tagged_ids(&self, tag: &str) -> Vec<String> {
        let mut members = self.tags.borrow().get(tag).cloned().unwrap_or_default();
        members.sort_by_key(|member| Reverse(member.priority));
        members.into_iter().map(|member| member.id).collect()
    }

    /// Resolve every member of `tag`; an unknown tag yields an empty list
    pub fn get_by_tag(&self, tag: &str) -> DiResult<Vec<Instance>> {
        self.tagged_ids(tag)
            .iter()
            .map(|id| {
                self.locator
                    .locate(id)
                    .map_err(|cause| DiError::TagResolutionFailed {
                        tag: tag.to_string(),
                        cause: Box::new(cause),
                    })
            })
            .collect()
    }

    /// Resolve every member of `tag`, panicking on failure
    pub fn must_get_by_tag(&self, tag: &str) -> Vec<Instance> {
        self.get_by_tag(tag).unwrap_or_else(|err| fail(err))
    }
}

impl<L: ServiceLocator> TagRegistry for TaggedContainer<L> {
    fn tag_service(&self, id: &str, tag: &str, priority: i32) -> DiResult<()> {
        TaggedContainer::tag_service(self, id, tag, priority)
    }

    fn override_tag_service(&self, id: &str, tag: &str, priority: i32) {
        TaggedContainer::override_tag_service(self, id, tag, priority)
    }

    fn is_tagged_by(&self, id: &str, tag: &str) -> bool {
        TaggedContainer::is_tagged_by(self, id, tag)
    }

    fn tagged_ids(&self, tag: &str) -> Vec<String> {
        TaggedContainer::tagged_ids(self, tag)
    }

    fn get_by_tag(&self, tag: &str) -> DiResult<Vec<Instance>> {
        TaggedContainer::get_by_tag(self, tag)
    }
}
