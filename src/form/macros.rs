//! Macros generating keyed form combinators.
//!
//! Rust has no anonymous keyed records, so the struct and union combinators
//! are generated: each invocation expands to a module holding the combined
//! `State`, the clean `Data`, the aggregate `Errors`, the `Actions` bundle,
//! and the `Machine` wiring them together. Invoke them at module scope; the
//! generated module sees its parent's items through `use super::*`.

/// Generate a struct-of-fields form combinator as a module.
///
/// Each declared field is a machine in its own right; the generated
/// machine owns one state entry per field and scopes each field's bundle
/// with a lens, so editing one field never rebuilds its siblings.
///
/// `validate` follows collect-all semantics: every field is validated even
/// after one fails, each field's own error state is written, and the fold
/// either yields the combined `Data` or an `Errors` shape with one
/// `Option` slot per field.
///
/// # Example
///
/// ```rust
/// use formwork::{form, form_struct, runtime};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// enum SignupError {
///     Required,
/// }
///
/// impl From<form::RequiredError> for SignupError {
///     fn from(_: form::RequiredError) -> Self {
///         Self::Required
///     }
/// }
///
/// form_struct! {
///     pub mod signup {
///         name: form::FormField<String, String, SignupError> = form::trim_non_empty_text(),
///         email: form::FormField<String, String, SignupError> = form::non_empty_text(),
///     }
/// }
///
/// fn main() {
///     let form = runtime::run(signup::machine());
///     form.actions.name.set("Ada".into());
///
///     let errors = form.actions.validate().unwrap_err().into_error();
///     assert_eq!(errors.name, None);
///     assert_eq!(errors.email, Some(SignupError::Required));
///
///     form.actions.email.set("ada@example.com".into());
///     let data = form.actions.validate().unwrap();
///     assert_eq!(data.name, "Ada");
/// }
/// ```
#[macro_export]
macro_rules! form_struct {
    (
        $(#[$meta:meta])*
        $vis:vis mod $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $machine_ty:ty = $machine:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis mod $name {
            use super::*;

            #[allow(unused_imports)]
            use $crate::{FormActions as _, StateMachine as _};

            /// Combined state: one entry per field.
            #[derive(Clone, Debug, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            pub struct State {
                $(
                    $(#[$field_meta])*
                    pub $field: <$machine_ty as $crate::StateMachine>::State,
                )*
            }

            /// Clean data produced when every field validates.
            #[derive(Clone, Debug, PartialEq)]
            pub struct Data {
                $(
                    pub $field: <<$machine_ty as $crate::StateMachine>::Actions
                        as $crate::FormActions>::Data,
                )*
            }

            /// Aggregate error shape: one slot per field, `None` where the
            /// field passed.
            #[derive(Clone, Debug, PartialEq)]
            pub struct Errors {
                $(
                    pub $field: ::std::option::Option<
                        <<$machine_ty as $crate::StateMachine>::Actions
                            as $crate::FormActions>::Error,
                    >,
                )*
            }

            /// One bundle per field, each scoped to its own state entry.
            pub struct Actions {
                $(
                    pub $field: <$machine_ty as $crate::StateMachine>::Actions,
                )*
            }

            impl Actions {
                /// Validate every field, then fold the outcomes.
                ///
                /// All fields are validated even when early ones fail, and
                /// each field's error state is written by its own run.
                pub fn validate(
                    &self,
                ) -> ::std::result::Result<Data, $crate::ValidationError<Errors>> {
                    $(
                        let $field = $crate::FormActions::validate(&self.$field);
                    )*
                    match ($( $field, )*) {
                        ($( ::std::result::Result::Ok($field), )*) => {
                            ::std::result::Result::Ok(Data {
                                $( $field, )*
                            })
                        }
                        ($( $field, )*) => {
                            ::std::result::Result::Err($crate::ValidationError::new(Errors {
                                $(
                                    $field: $field
                                        .err()
                                        .map($crate::ValidationError::into_error),
                                )*
                            }))
                        }
                    }
                }

                /// [`validate`](Self::validate), reified as a future.
                pub async fn check(
                    &self,
                ) -> ::std::result::Result<Data, $crate::ValidationError<Errors>> {
                    self.validate()
                }

                /// Push clean data into every field.
                pub fn set_state_from_data(&self, data: &Data) {
                    $(
                        $crate::FormActions::set_state_from_data(&self.$field, &data.$field);
                    )*
                }
            }

            impl $crate::FormActions for Actions {
                type Data = Data;
                type Error = Errors;

                fn validate(
                    &self,
                ) -> ::std::result::Result<Data, $crate::ValidationError<Errors>> {
                    Actions::validate(self)
                }

                fn set_state_from_data(&self, data: &Data) {
                    Actions::set_state_from_data(self, data)
                }
            }

            /// The composed machine; build it with [`machine`].
            pub struct Machine {
                $(
                    $field: $machine_ty,
                )*
            }

            /// Build the machine from its field machines.
            pub fn machine() -> Machine {
                Machine {
                    $(
                        $field: $machine,
                    )*
                }
            }

            impl $crate::StateMachine for Machine {
                type State = State;
                type Actions = Actions;

                fn initial_state(&self) -> State {
                    State {
                        $(
                            $field: self.$field.initial_state(),
                        )*
                    }
                }

                fn actions(&self, store: $crate::Store<State>) -> Actions {
                    Actions {
                        $(
                            $field: self.$field.actions(store.zoom($crate::Lens::new(
                                |state: &State| state.$field.clone(),
                                |mut state: State, part| {
                                    state.$field = part;
                                    state
                                },
                            ))),
                        )*
                    }
                }

                fn start(
                    &self,
                    store: &$crate::Store<State>,
                ) -> ::std::option::Option<$crate::__private::BoxFuture<'static, ()>> {
                    let mut tasks = ::std::vec::Vec::new();
                    $(
                        if let ::std::option::Option::Some(task) =
                            self.$field.start(&store.zoom($crate::Lens::new(
                                |state: &State| state.$field.clone(),
                                |mut state: State, part| {
                                    state.$field = part;
                                    state
                                },
                            )))
                        {
                            tasks.push(task);
                        }
                    )*
                    if tasks.is_empty() {
                        ::std::option::Option::None
                    } else {
                        ::std::option::Option::Some(::std::boxed::Box::pin(async move {
                            $crate::__private::join_all(tasks).await;
                        }))
                    }
                }

                fn on_update(
                    &self,
                    state: &State,
                ) -> ::std::option::Option<$crate::__private::BoxFuture<'static, ()>> {
                    let mut tasks = ::std::vec::Vec::new();
                    $(
                        if let ::std::option::Option::Some(task) =
                            self.$field.on_update(&state.$field)
                        {
                            tasks.push(task);
                        }
                    )*
                    if tasks.is_empty() {
                        ::std::option::Option::None
                    } else {
                        ::std::option::Option::Some(::std::boxed::Box::pin(async move {
                            $crate::__private::join_all(tasks).await;
                        }))
                    }
                }
            }
        }
    };
}

/// Generate a tagged-union form combinator as a module.
///
/// All variants' states coexist; the tag field named after `by` records
/// which variant is active. Switching the tag is a metadata change that
/// leaves every variant's state untouched, so edits made under one tag
/// survive a round trip through another.
///
/// `validate` delegates to the active variant only and wraps its outcome
/// in the tagged `Data`/`Errors` enums; inactive variants are neither
/// validated nor touched. The tag itself always validates, with
/// [`Never`](crate::form::Never) as its error type.
///
/// # Example
///
/// ```rust
/// use formwork::{form, form_union, runtime};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// enum ContactError {
///     Required,
/// }
///
/// impl From<form::RequiredError> for ContactError {
///     fn from(_: form::RequiredError) -> Self {
///         Self::Required
///     }
/// }
///
/// form_union! {
///     pub mod contact by channel {
///         Email: form::FormField<String, String, ContactError> = form::non_empty_text(),
///         Phone: form::FormField<String, String, ContactError> = form::non_empty_text(),
///     }
/// }
///
/// fn main() {
///     let form = runtime::run(contact::machine());
///     assert_eq!(form.actions.channel.get(), contact::Tag::Email);
///
///     // Edits to an inactive variant persist.
///     form.actions.Phone.set("555-0100".into());
///     form.actions.channel.set(contact::Tag::Phone);
///
///     let data = form.actions.validate().unwrap();
///     assert_eq!(data, contact::Data::Phone("555-0100".into()));
/// }
/// ```
#[macro_export]
macro_rules! form_union {
    (
        $(#[$meta:meta])*
        $vis:vis mod $name:ident by $tag:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident : $machine_ty:ty = $machine:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis mod $name {
            use super::*;

            #[allow(unused_imports)]
            use $crate::{FormActions as _, StateMachine as _};

            /// Which variant is active.
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, ::serde::Serialize, ::serde::Deserialize,
            )]
            pub enum Tag {
                $(
                    $(#[$variant_meta])*
                    $variant,
                )*
            }

            impl Tag {
                /// Every tag, in declaration order.
                pub const VARIANTS: &'static [Tag] = &[$( Tag::$variant, )*];

                /// The initially active tag: the first declared variant.
                pub fn initial() -> Tag {
                    Self::VARIANTS[0]
                }
            }

            /// Combined state: the active tag plus every variant's state.
            #[allow(non_snake_case)]
            #[derive(Clone, Debug, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            pub struct State {
                pub $tag: $crate::FieldState<Tag, $crate::Never>,
                $(
                    pub $variant: <$machine_ty as $crate::StateMachine>::State,
                )*
            }

            /// Clean data: the active variant's data, tagged.
            #[derive(Clone, Debug, PartialEq)]
            pub enum Data {
                $(
                    $variant(
                        <<$machine_ty as $crate::StateMachine>::Actions
                            as $crate::FormActions>::Data,
                    ),
                )*
            }

            impl Data {
                /// The tag this data belongs to.
                pub fn tag(&self) -> Tag {
                    match self {
                        $(
                            Data::$variant(_) => Tag::$variant,
                        )*
                    }
                }
            }

            /// Error shape: the failing variant's errors, tagged.
            #[derive(Clone, Debug, PartialEq)]
            pub enum Errors {
                $(
                    $variant(
                        <<$machine_ty as $crate::StateMachine>::Actions
                            as $crate::FormActions>::Error,
                    ),
                )*
            }

            /// The tag bundle plus one bundle per variant, active or not.
            #[allow(non_snake_case)]
            pub struct Actions {
                pub $tag: $crate::TagActions<Tag>,
                $(
                    pub $variant: <$machine_ty as $crate::StateMachine>::Actions,
                )*
            }

            impl Actions {
                /// Validate the active variant and tag its outcome.
                ///
                /// Inactive variants are neither validated nor touched.
                pub fn validate(
                    &self,
                ) -> ::std::result::Result<Data, $crate::ValidationError<Errors>> {
                    match self.$tag.get() {
                        $(
                            Tag::$variant => $crate::FormActions::validate(&self.$variant)
                                .map(Data::$variant)
                                .map_err(|failure| {
                                    $crate::ValidationError::new(Errors::$variant(
                                        failure.into_error(),
                                    ))
                                }),
                        )*
                    }
                }

                /// [`validate`](Self::validate), reified as a future.
                pub async fn check(
                    &self,
                ) -> ::std::result::Result<Data, $crate::ValidationError<Errors>> {
                    self.validate()
                }

                /// Switch to the data's variant and refill it.
                ///
                /// Other variants keep whatever state they had.
                pub fn set_state_from_data(&self, data: &Data) {
                    self.$tag.set(data.tag());
                    match data {
                        $(
                            Data::$variant(payload) => {
                                $crate::FormActions::set_state_from_data(
                                    &self.$variant,
                                    payload,
                                );
                            }
                        )*
                    }
                }
            }

            impl $crate::FormActions for Actions {
                type Data = Data;
                type Error = Errors;

                fn validate(
                    &self,
                ) -> ::std::result::Result<Data, $crate::ValidationError<Errors>> {
                    Actions::validate(self)
                }

                fn set_state_from_data(&self, data: &Data) {
                    Actions::set_state_from_data(self, data)
                }
            }

            /// The composed machine; build it with [`machine`].
            #[allow(non_snake_case)]
            pub struct Machine {
                $(
                    $variant: $machine_ty,
                )*
            }

            /// Build the machine from its variant machines.
            pub fn machine() -> Machine {
                Machine {
                    $(
                        $variant: $machine,
                    )*
                }
            }

            impl $crate::StateMachine for Machine {
                type State = State;
                type Actions = Actions;

                fn initial_state(&self) -> State {
                    State {
                        $tag: $crate::FieldState::new(Tag::initial()),
                        $(
                            $variant: self.$variant.initial_state(),
                        )*
                    }
                }

                fn actions(&self, store: $crate::Store<State>) -> Actions {
                    Actions {
                        $tag: $crate::TagActions::new(store.zoom($crate::Lens::new(
                            |state: &State| state.$tag.clone(),
                            |mut state: State, part| {
                                state.$tag = part;
                                state
                            },
                        ))),
                        $(
                            $variant: self.$variant.actions(store.zoom($crate::Lens::new(
                                |state: &State| state.$variant.clone(),
                                |mut state: State, part| {
                                    state.$variant = part;
                                    state
                                },
                            ))),
                        )*
                    }
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::form::{self, FormField};
    use crate::runtime;

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

    fn age() -> FormField<u32, String, TestError> {
        form::trim_text::<TestError>().parse(
            |text: String| text.parse::<u32>().map_err(|_| TestError::NotANumber),
            |age| age.to_string(),
        )
    }

    form_struct! {
        mod profile {
            name: FormField<String, String, TestError> = form::trim_non_empty_text(),
            age: FormField<u32, String, TestError> = age(),
        }
    }

    form_struct! {
        mod nested {
            note: FormField<String, String, TestError> = form::text(),
            inner: profile::Machine = profile::machine(),
        }
    }

    form_union! {
        mod payment by method {
            Card: FormField<String, String, TestError> = form::non_empty_text(),
            Voucher: FormField<u32, String, TestError> = age(),
        }
    }

    #[test]
    fn struct_initial_state_combines_fields() {
        let form = runtime::run(profile::machine());
        let state = form.state();
        assert_eq!(state.name.value, "");
        assert_eq!(state.name.error, None);
        assert_eq!(state.age.value, "");
    }

    #[test]
    fn struct_field_edit_leaves_siblings_untouched() {
        let form = runtime::run(profile::machine());
        form.actions.age.set("44".into());

        assert_eq!(form.state().age.value, "44");
        assert_eq!(form.state().name.value, "");
    }

    #[test]
    fn struct_validate_returns_combined_data() {
        let form = runtime::run(profile::machine());
        form.actions.name.set("  Ada ".into());
        form.actions.age.set("36".into());

        let data = form.actions.validate().unwrap();
        assert_eq!(data.name, "Ada");
        assert_eq!(data.age, 36);
    }

    #[test]
    fn struct_validate_collects_every_failing_branch() {
        let form = runtime::run(profile::machine());
        form.actions.age.set("not a number".into());

        let errors = form.actions.validate().unwrap_err().into_error();
        assert_eq!(errors.name, Some(TestError::Required));
        assert_eq!(errors.age, Some(TestError::NotANumber));

        // Each branch wrote its own error state.
        assert_eq!(form.state().name.error, Some(TestError::Required));
        assert_eq!(form.state().age.error, Some(TestError::NotANumber));
    }

    #[test]
    fn struct_validate_runs_passing_branches_too() {
        let form = runtime::run(profile::machine());
        form.actions.name.set("Ada".into());
        form.actions.name.set_error(Some(TestError::Required));
        form.actions.age.set("".into());

        let errors = form.actions.validate().unwrap_err().into_error();
        assert_eq!(errors.name, None);
        assert_eq!(errors.age, Some(TestError::NotANumber));

        // The passing branch cleared its stale error.
        assert_eq!(form.state().name.error, None);
    }

    #[test]
    fn struct_set_state_from_data_fills_every_field() {
        let form = runtime::run(profile::machine());
        form.actions.validate().unwrap_err();

        form.actions.set_state_from_data(&profile::Data {
            name: "Grace".into(),
            age: 47,
        });

        assert_eq!(form.state().name.value, "Grace");
        assert_eq!(form.state().name.error, None);
        assert_eq!(form.state().age.value, "47");
        assert_eq!(form.actions.validate().unwrap().age, 47);
    }

    #[test]
    fn nested_struct_validates_depth_first() {
        let form = runtime::run(nested::machine());
        form.actions.inner.age.set("77".into());

        let errors = form.actions.validate().unwrap_err().into_error();
        assert_eq!(errors.note, None);
        let inner = errors.inner.unwrap();
        assert_eq!(inner.name, Some(TestError::Required));
        assert_eq!(inner.age, None);

        assert_eq!(form.state().inner.name.error, Some(TestError::Required));
    }

    #[test]
    fn nested_struct_set_state_from_data_goes_deep() {
        let form = runtime::run(nested::machine());
        form.actions.set_state_from_data(&nested::Data {
            note: "imported".into(),
            inner: profile::Data {
                name: "Ada".into(),
                age: 36,
            },
        });

        assert_eq!(form.state().note.value, "imported");
        assert_eq!(form.state().inner.age.value, "36");
    }

    #[test]
    fn struct_state_serializes() {
        let form = runtime::run(profile::machine());
        form.actions.name.set("Ada".into());

        let json = serde_json::to_string(&form.state()).unwrap();
        let back: profile::State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form.state());
    }

    #[test]
    fn union_initial_tag_is_first_declared() {
        let form = runtime::run(payment::machine());
        assert_eq!(form.state().method.value, payment::Tag::Card);
        assert_eq!(payment::Tag::VARIANTS, &[payment::Tag::Card, payment::Tag::Voucher]);
    }

    #[test]
    fn union_tag_switch_is_metadata_only() {
        let form = runtime::run(payment::machine());
        form.actions.Card.set("4111".into());
        form.actions.Voucher.set("99".into());

        form.actions.method.set(payment::Tag::Voucher);

        assert_eq!(form.state().method.value, payment::Tag::Voucher);
        assert_eq!(form.state().Card.value, "4111");
        assert_eq!(form.state().Voucher.value, "99");
    }

    #[test]
    fn union_validate_delegates_to_active_variant_only() {
        let form = runtime::run(payment::machine());
        form.actions.Card.set("4111".into());
        // The inactive variant holds invalid content.
        form.actions.Voucher.set("broken".into());

        let data = form.actions.validate().unwrap();
        assert_eq!(data, payment::Data::Card("4111".into()));
        assert_eq!(data.tag(), payment::Tag::Card);

        // The inactive variant was not validated: no error written.
        assert_eq!(form.state().Voucher.error, None);
    }

    #[test]
    fn union_validate_wraps_active_failure() {
        let form = runtime::run(payment::machine());
        form.actions.method.set(payment::Tag::Voucher);
        form.actions.Voucher.set("broken".into());

        let errors = form.actions.validate().unwrap_err().into_error();
        assert_eq!(errors, payment::Errors::Voucher(TestError::NotANumber));
        assert_eq!(form.state().Voucher.error, Some(TestError::NotANumber));
    }

    #[test]
    fn union_set_state_from_data_switches_and_fills() {
        let form = runtime::run(payment::machine());
        form.actions.Card.set("kept".into());

        form.actions.set_state_from_data(&payment::Data::Voucher(12));

        assert_eq!(form.state().method.value, payment::Tag::Voucher);
        assert_eq!(form.state().Voucher.value, "12");
        // The other variant keeps its state.
        assert_eq!(form.state().Card.value, "kept");
    }

    #[test]
    fn union_tag_always_validates() {
        let form = runtime::run(payment::machine());
        assert_eq!(form.actions.method.validate().unwrap(), payment::Tag::Card);
    }

    #[test]
    fn union_state_serializes() {
        let form = runtime::run(payment::machine());
        form.actions.Voucher.set("31".into());

        let json = serde_json::to_string(&form.state()).unwrap();
        let back: payment::State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form.state());
    }

    #[tokio::test]
    async fn struct_check_reifies_validate() {
        let form = runtime::run(profile::machine());
        form.actions.name.set("Ada".into());
        form.actions.age.set("36".into());
        assert!(form.actions.check().await.is_ok());
    }
}
