//! Property-based tests for lenses, scoped stores, and form machines.
//!
//! These tests use proptest to verify laws hold across many randomly
//! generated states and edits.

use formwork::{form, form_struct, lens, machines, runtime};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    street: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    address: Address,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Account {
    person: Person,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum TestError {
    Required,
    NotANumber,
}

impl From<form::RequiredError> for TestError {
    fn from(_: form::RequiredError) -> Self {
        Self::Required
    }
}

fn score_field() -> form::FormField<u32, String, TestError> {
    form::trim_text::<TestError>().parse(
        |text: String| text.parse::<u32>().map_err(|_| TestError::NotANumber),
        |score| score.to_string(),
    )
}

form_struct! {
    mod survey {
        nickname: form::FormField<String, String, TestError> = form::non_empty_text(),
        score: form::FormField<u32, String, TestError> = score_field(),
    }
}

prop_compose! {
    fn arbitrary_account()(
        name in "[a-z]{0,8}",
        city in "[a-z]{0,8}",
        street in "[a-z]{0,8}",
    ) -> Account {
        Account {
            person: Person {
                name,
                address: Address { city, street },
            },
        }
    }
}

proptest! {
    #[test]
    fn lens_get_put_round_trips(account in arbitrary_account()) {
        let person = lens!(Account, person);
        let read = person.read(&account);
        prop_assert_eq!(person.write(account.clone(), read), account);
    }

    #[test]
    fn lens_put_get_returns_written_part(
        account in arbitrary_account(),
        name in "[a-z]{0,8}",
    ) {
        let name_lens = lens!(Account, person).compose(lens!(Person, name));
        prop_assert_eq!(name_lens.read(&name_lens.write(account, name.clone())), name);
    }

    #[test]
    fn lens_put_put_keeps_the_last_write(
        account in arbitrary_account(),
        first in "[a-z]{0,8}",
        second in "[a-z]{0,8}",
    ) {
        let name_lens = lens!(Account, person).compose(lens!(Person, name));
        let twice = name_lens.write(name_lens.write(account.clone(), first), second.clone());
        prop_assert_eq!(twice, name_lens.write(account, second));
    }

    #[test]
    fn lens_compose_is_associative(
        account in arbitrary_account(),
        city in "[a-z]{0,8}",
    ) {
        let left = lens!(Account, person)
            .compose(lens!(Person, address))
            .compose(lens!(Address, city));
        let right = lens!(Account, person)
            .compose(lens!(Person, address).compose(lens!(Address, city)));

        prop_assert_eq!(left.read(&account), right.read(&account));
        prop_assert_eq!(
            left.write(account.clone(), city.clone()),
            right.write(account, city)
        );
    }

    #[test]
    fn zoom_twice_matches_composed_zoom(
        account in arbitrary_account(),
        city in "[a-z]{0,8}",
    ) {
        let via_zoom = runtime::run(machines::value(account.clone()));
        let via_compose = runtime::run(machines::value(account));

        let zoomed = via_zoom
            .store()
            .zoom(lens!(Account, person))
            .zoom(lens!(Person, address));
        let composed = via_compose
            .store()
            .zoom(lens!(Account, person).compose(lens!(Person, address)));

        let write_a = city.clone();
        zoomed.update(move |mut address| {
            address.city = write_a;
            address
        });
        let write_b = city;
        composed.update(move |mut address| {
            address.city = write_b;
            address
        });

        prop_assert_eq!(via_zoom.state(), via_compose.state());
    }

    #[test]
    fn any_edit_clears_a_stored_error(before in ".{0,8}", after in ".{0,8}") {
        let field = runtime::run(form::non_empty_text::<TestError>());
        field.actions.set(before);
        let _ = field.actions.validate();

        field.actions.set(after.clone());
        prop_assert_eq!(field.state().error, None);
        prop_assert_eq!(field.state().value, after);
    }

    #[test]
    fn field_validate_is_idempotent(input in ".{0,12}") {
        let field = runtime::run(score_field());
        field.actions.set(input);

        let first = field.actions.validate();
        let state = field.state();
        let second = field.actions.validate();

        prop_assert_eq!(first, second);
        prop_assert_eq!(field.state(), state);
    }

    #[test]
    fn field_refill_then_validate_round_trips(score in 0u32..1_000_000) {
        let field = runtime::run(score_field());
        field.actions.set_state_from_data(&score);
        prop_assert_eq!(field.actions.validate().unwrap(), score);
    }

    #[test]
    fn struct_refill_then_validate_round_trips(
        nickname in "[a-z]{1,8}",
        score in 0u32..1_000_000,
    ) {
        let survey = runtime::run(survey::machine());
        survey.actions.set_state_from_data(&survey::Data {
            nickname: nickname.clone(),
            score,
        });

        let data = survey.actions.validate().unwrap();
        prop_assert_eq!(data.nickname, nickname);
        prop_assert_eq!(data.score, score);
    }

    #[test]
    fn list_refill_matches_data_length(
        values in prop::collection::vec("[a-z]{1,6}", 0..8)
    ) {
        let list = runtime::run(form::list(form::non_empty_text::<TestError>()));
        list.actions.add_item();

        list.actions.set_state_from_data(&values);
        prop_assert_eq!(list.actions.len(), values.len());
        prop_assert_eq!(list.actions.validate().unwrap(), values);
    }

    #[test]
    fn list_remove_shifts_later_items(count in 2usize..6, picked in 0usize..8) {
        let index = picked % count;
        let list = runtime::run(form::list(form::text::<TestError>()));

        for i in 0..count {
            list.actions.add_item();
            list.actions.index(i).set(format!("item-{i}"));
        }

        list.actions.remove_item(index);

        let state = list.state();
        prop_assert_eq!(state.len(), count - 1);
        for (position, entry) in state.iter().enumerate() {
            let original = if position < index { position } else { position + 1 };
            prop_assert_eq!(&entry.value, &format!("item-{original}"));
        }
    }
}
