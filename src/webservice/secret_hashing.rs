// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

use tokio::task;

use crate::config::Config;
use crate::webservice::error::WebserviceProviderError;

/// Calculate the credential secret hash with the configuration defaults.
pub async fn hash_secret<S: AsRef<[u8]>>(
    conf: &Config,
    secret: S,
) -> Result<String, WebserviceProviderError> {
    let secret_bytes = secret.as_ref().to_owned();
    let rounds = conf.webservice.secret_hash_rounds;
    // Do not block the main thread with a definitely long running call.
    let hash = task::spawn_blocking(move || bcrypt::hash(secret_bytes, rounds)).await??;
    Ok(hash)
}

/// Verify the secret matches the hashed value.
pub async fn verify_secret<S: AsRef<[u8]>, H: AsRef<str>>(
    secret: S,
    hash: H,
) -> Result<bool, WebserviceProviderError> {
    let secret_bytes = secret.as_ref().to_owned();
    let secret_hash = hash.as_ref().to_string();
    // Do not block the main thread with a definitely long running call.
    let verify = task::spawn_blocking(move || bcrypt::verify(secret_bytes, &secret_hash)).await??;
    Ok(verify)
}
