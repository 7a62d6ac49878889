use alloc::string::String;
use core::fmt;

// -----------------------------------------------------------------------------
// Access

/// The direction of a property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Get,
    Set,
}

impl Access {
    /// The prefix of the hook method names for this access.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
        }
    }
}

// -----------------------------------------------------------------------------
// Hook

/// One property access a [`Listener`](crate::Listener) may intercept.
///
/// # Examples
///
/// ```
/// use dto_listen::Hook;
///
/// assert_eq!(Hook::get("first_name").method_name(), "getFirstName");
/// assert_eq!(Hook::set("age").method_name(), "setAge");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hook<'a> {
    access: Access,
    property: &'a str,
}

impl<'a> Hook<'a> {
    #[inline]
    pub const fn new(access: Access, property: &'a str) -> Self {
        Self { access, property }
    }

    /// A read of `property`.
    #[inline]
    pub const fn get(property: &'a str) -> Self {
        Self::new(Access::Get, property)
    }

    /// A write of `property`.
    #[inline]
    pub const fn set(property: &'a str) -> Self {
        Self::new(Access::Set, property)
    }

    #[inline]
    pub const fn access(&self) -> Access {
        self.access
    }

    /// The property name, as accessed.
    #[inline]
    pub const fn property(&self) -> &'a str {
        self.property
    }

    /// The conventional name of the hook method: the access prefix
    /// followed by the property in upper camel case.
    ///
    /// Words are separated by underscores. Only the first letter of each
    /// word is upper-cased, the rest is kept as is.
    pub fn method_name(&self) -> String {
        let mut name = String::with_capacity(self.property.len() + 3);
        name.push_str(self.access.prefix());
        for word in self.property.split('_') {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
        name
    }
}

impl fmt::Display for Hook<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.method_name())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{Access, Hook};

    #[test]
    fn method_names_are_upper_camel_case() {
        assert_eq!(Hook::get("first_name").method_name(), "getFirstName");
        assert_eq!(Hook::set("first_name").method_name(), "setFirstName");
        assert_eq!(Hook::get("name").method_name(), "getName");
        assert_eq!(Hook::get("createdAt").method_name(), "getCreatedAt");
        assert_eq!(Hook::get("address_line_2").method_name(), "getAddressLine2");
    }

    #[test]
    fn stray_underscores_are_dropped() {
        assert_eq!(Hook::get("_private").method_name(), "getPrivate");
        assert_eq!(Hook::get("a__b_").method_name(), "getAB");
        assert_eq!(Hook::set("").method_name(), "set");
    }

    #[test]
    fn display_is_the_method_name() {
        let hook = Hook::new(Access::Set, "zip_code");
        assert_eq!(hook.to_string(), "setZipCode");
        assert_eq!(hook.property(), "zip_code");
        assert_eq!(hook.access(), Access::Set);
    }
}
