/**
 * Access codes and the registry that maps
 *  them onto the directories they unlock.
 */
pub mod registry;
/**
 * Exchanging a submitted code for an
 *  authorization token.
 */
pub mod verify;
/**
 * Per-request gate: does this token unlock
 *  the directory being browsed?
 */
pub mod guard;
/**
 * Resolving requested paths under the storage
 *  root and enumerating directories.
 */
pub mod lister;
/**
 * Shapes a directory listing into display data:
 *  date folder labels, file icons, back links.
 */
pub mod render;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::guard::{authorize, Access, DenyReason, RequestedPath};
    pub use crate::lister::{DirectoryEntry, DirectoryLister, ListError, Listing};
    pub use crate::registry::{AccessCode, CodeRegistry, DirectoryName, RegistryError};
    pub use crate::render::{ListingView, RenderedEntry};
    pub use crate::verify::{verify, Verification, INVALID_CODE_MESSAGE};
    pub use crate::version::build_info;
}
