use crate::canon::CanonicalSilhouette;
use crate::util::SilMatchResult;

/// Persistence collaborator for canonical silhouettes.
///
/// The corpus only issues explicit store/load/delete requests; layout and
/// encoding belong to the implementation.
pub trait SilhouetteStore {
    /// Writes the asset for `id`, replacing any previous one.
    fn store(&self, id: &str, silhouette: &CanonicalSilhouette) -> SilMatchResult<()>;

    /// Reads the asset for `id`.
    fn load(&self, id: &str) -> SilMatchResult<CanonicalSilhouette>;

    /// Removes the asset for `id`. Deleting a missing asset is not an error.
    fn delete(&self, id: &str) -> SilMatchResult<()>;

    /// Lists stored identifiers in a stable order.
    fn list(&self) -> SilMatchResult<Vec<String>>;
}
