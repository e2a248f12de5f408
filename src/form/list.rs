//! Homogeneous collections of a form machine, addressed by position.
//!
//! A [`List`] holds zero or more instances of one item machine in a
//! `Vec` of item states. Items have positional identity: removing an item
//! shifts every later item down, and bundles handed out for a position
//! keep pointing at that position, not at the item that used to be there.

use std::sync::Arc;

use crate::core::{Lens, StateMachine, Store};
use crate::form::{FormActions, ValidationError};

type ItemData<M> = <<M as StateMachine>::Actions as FormActions>::Data;
type ItemError<M> = <<M as StateMachine>::Actions as FormActions>::Error;

/// Machine for a growable list of `M` items.
pub struct List<M> {
    item: Arc<M>,
}

impl<M> Clone for List<M> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
        }
    }
}

/// Build a [`List`] whose items are instances of `item`.
///
/// The list starts empty; `item` serves as the template whose initial
/// state seeds every added item.
///
/// # Example
///
/// ```rust
/// use formwork::{form, runtime};
///
/// let tags = runtime::run(form::list(form::non_empty_text::<form::RequiredError>()));
///
/// tags.actions.add_item();
/// tags.actions.index(0).set("rust".into());
/// assert_eq!(tags.actions.validate().unwrap(), vec!["rust".to_string()]);
/// ```
pub fn list<M>(item: M) -> List<M>
where
    M: StateMachine,
    M::Actions: FormActions,
{
    List {
        item: Arc::new(item),
    }
}

/// Action bundle for a [`List`].
pub struct ListActions<M: StateMachine> {
    item: Arc<M>,
    store: Store<Vec<M::State>>,
}

impl<M: StateMachine> Clone for ListActions<M> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
            store: self.store.clone(),
        }
    }
}

impl<M> ListActions<M>
where
    M: StateMachine,
    M::Actions: FormActions,
{
    /// Append a fresh item seeded with the template's initial state.
    pub fn add_item(&self) {
        let state = self.item.initial_state();
        self.store.update(move |mut items| {
            items.push(state);
            items
        })
    }

    /// Remove the item at `index`, shifting later items down.
    ///
    /// Out-of-range indexes are ignored.
    pub fn remove_item(&self, index: usize) {
        self.store.update(move |mut items| {
            if index < items.len() {
                items.remove(index);
            }
            items
        })
    }

    /// Number of items currently in the list.
    pub fn len(&self) -> usize {
        self.store.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.get().is_empty()
    }

    /// The item bundle for position `index`.
    ///
    /// The bundle addresses the position, not the item: after a removal it
    /// operates on whichever item has shifted into that slot.
    ///
    /// # Panics
    ///
    /// Using the returned bundle panics if `index` is out of range at that
    /// point; callers guard with [`len`](Self::len).
    pub fn index(&self, index: usize) -> M::Actions {
        self.item.actions(self.store.zoom(Lens::new(
            move |items: &Vec<M::State>| items[index].clone(),
            move |mut items: Vec<M::State>, item| {
                items[index] = item;
                items
            },
        )))
    }

    /// Validate every item, then fold the outcomes.
    ///
    /// All items are validated even when early ones fail, so every item's
    /// error state reflects this run. The error shape holds one slot per
    /// item, `None` where that item passed.
    pub fn validate(
        &self,
    ) -> Result<Vec<ItemData<M>>, ValidationError<Vec<Option<ItemError<M>>>>> {
        let count = self.len();
        let mut collected = Vec::with_capacity(count);
        let mut errors = Vec::with_capacity(count);
        let mut failed = false;

        for index in 0..count {
            match self.index(index).validate() {
                Ok(data) => {
                    collected.push(data);
                    errors.push(None);
                }
                Err(failure) => {
                    failed = true;
                    errors.push(Some(failure.into_error()));
                }
            }
        }

        if failed {
            Err(ValidationError::new(errors))
        } else {
            Ok(collected)
        }
    }

    /// [`validate`](Self::validate), reified as a future.
    pub async fn check(
        &self,
    ) -> Result<Vec<ItemData<M>>, ValidationError<Vec<Option<ItemError<M>>>>> {
        self.validate()
    }

    /// Rebuild the list to match `data`, discarding current items.
    ///
    /// Every entry starts from the template's initial state before being
    /// refilled, so stale values and errors cannot survive.
    pub fn set_state_from_data(&self, data: &[ItemData<M>]) {
        let fresh: Vec<M::State> = data.iter().map(|_| self.item.initial_state()).collect();
        self.store.update(move |_| fresh);

        for (index, item) in data.iter().enumerate() {
            self.index(index).set_state_from_data(item);
        }
    }
}

impl<M> StateMachine for List<M>
where
    M: StateMachine,
    M::Actions: FormActions,
{
    type State = Vec<M::State>;
    type Actions = ListActions<M>;

    fn initial_state(&self) -> Vec<M::State> {
        Vec::new()
    }

    fn actions(&self, store: Store<Vec<M::State>>) -> ListActions<M> {
        ListActions {
            item: Arc::clone(&self.item),
            store,
        }
    }
}

impl<M> FormActions for ListActions<M>
where
    M: StateMachine,
    M::Actions: FormActions,
{
    type Data = Vec<ItemData<M>>;
    type Error = Vec<Option<ItemError<M>>>;

    fn validate(&self) -> Result<Self::Data, ValidationError<Self::Error>> {
        ListActions::validate(self)
    }

    fn set_state_from_data(&self, data: &Self::Data) {
        ListActions::set_state_from_data(self, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{non_empty_text, FieldState, FormField, RequiredError};
    use crate::runtime::{self, Instance};

    fn tags() -> Instance<List<FormField<String, String, RequiredError>>> {
        runtime::run(list(non_empty_text::<RequiredError>()))
    }

    #[test]
    fn starts_empty() {
        let instance = tags();
        assert!(instance.actions.is_empty());
        assert_eq!(
            instance.state(),
            Vec::<FieldState<String, RequiredError>>::new()
        );
    }

    #[test]
    fn add_item_appends_the_template_state() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.add_item();

        assert_eq!(instance.actions.len(), 2);
        assert_eq!(instance.state()[1].value, "");
        assert_eq!(instance.state()[1].error, None);
    }

    #[test]
    fn index_bundle_edits_only_that_position() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.add_item();

        instance.actions.index(1).set("second".into());
        assert_eq!(instance.state()[0].value, "");
        assert_eq!(instance.state()[1].value, "second");
    }

    #[test]
    fn remove_item_shifts_later_items_down() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.add_item();
        instance.actions.index(0).set("first".into());
        instance.actions.index(1).set("second".into());

        instance.actions.remove_item(0);

        assert_eq!(instance.actions.len(), 1);
        assert_eq!(instance.state()[0].value, "second");

        // The position-0 bundle now addresses the shifted item.
        instance.actions.index(0).set("rewritten".into());
        assert_eq!(instance.state()[0].value, "rewritten");
    }

    #[test]
    fn remove_item_out_of_range_is_ignored() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.remove_item(9);
        assert_eq!(instance.actions.len(), 1);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_bundle_out_of_range_panics_when_used() {
        let instance = tags();
        let ghost = instance.actions.index(3);
        ghost.set("boom".into());
    }

    #[test]
    fn validate_collects_every_item_outcome() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.add_item();
        instance.actions.index(1).set("ok".into());

        let failure = instance.actions.validate().unwrap_err();
        assert_eq!(failure.into_error(), vec![Some(RequiredError), None]);

        // Both items' error states reflect this run.
        assert_eq!(instance.state()[0].error, Some(RequiredError));
        assert_eq!(instance.state()[1].error, None);
    }

    #[test]
    fn validate_collects_data_in_order() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.add_item();
        instance.actions.index(0).set("a".into());
        instance.actions.index(1).set("b".into());

        assert_eq!(
            instance.actions.validate().unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn set_state_from_data_discards_current_items() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.index(0).set("stale".into());
        instance.actions.validate().unwrap();

        instance
            .actions
            .set_state_from_data(&vec!["one".to_string(), "two".to_string()]);

        assert_eq!(instance.actions.len(), 2);
        assert_eq!(instance.state()[0].value, "one");
        assert_eq!(instance.state()[1].value, "two");
        assert_eq!(instance.state()[0].error, None);
    }

    #[test]
    fn set_state_from_data_with_empty_data_clears_the_list() {
        let instance = tags();
        instance.actions.add_item();
        instance.actions.set_state_from_data(&Vec::new());
        assert!(instance.actions.is_empty());
    }
}
