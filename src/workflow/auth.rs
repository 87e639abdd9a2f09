//! Authentication flow probes

use std::collections::BTreeSet;

use crate::types::{AuthFlowSignals, FileAnalysis};

#[derive(Clone, Copy)]
enum Facet {
    Method,
    Provider,
    Flow,
}

struct AuthProbe {
    facet: Facet,
    label: &'static str,
    /// Lower-case substrings; any one is enough
    needles: &'static [&'static str],
}

const AUTH_PROBES: &[AuthProbe] = &[
    // Methods
    AuthProbe {
        facet: Facet::Method,
        label: "JWT",
        needles: &["jsonwebtoken", "jwt.sign", "jwt.verify", "jwt.decode", "pyjwt", "bearer "],
    },
    AuthProbe {
        facet: Facet::Method,
        label: "Session",
        needles: &["express-session", "req.session", "getserversession", "usesession", "request.session"],
    },
    AuthProbe {
        facet: Facet::Method,
        label: "OAuth",
        needles: &["oauth", "authorization_code", "openid"],
    },
    AuthProbe {
        facet: Facet::Method,
        label: "API key",
        needles: &["x-api-key", "api_key_header", "apikeyauth"],
    },
    AuthProbe {
        facet: Facet::Method,
        label: "Password",
        needles: &["bcrypt", "argon2", "passlib", "signinwithemailandpassword", "check_password"],
    },
    AuthProbe {
        facet: Facet::Method,
        label: "Magic link",
        needles: &["signinwithotp", "magic link", "magiclink", "sendsigninlinktoemail"],
    },
    AuthProbe {
        facet: Facet::Method,
        label: "Two-factor",
        needles: &["totp", "two_factor", "twofactor", "2fa", "mfa"],
    },
    // Providers
    AuthProbe {
        facet: Facet::Provider,
        label: "NextAuth",
        needles: &["next-auth", "nextauth"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Auth0",
        needles: &["auth0"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Firebase Auth",
        needles: &["firebase/auth", "getauth(", "firebase.auth"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Supabase Auth",
        needles: &["supabase.auth"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Clerk",
        needles: &["@clerk/"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Passport",
        needles: &["passport.authenticate", "passport.use", "from 'passport'", "require('passport')"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Cognito",
        needles: &["amazon-cognito", "aws-amplify/auth", "cognito"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Google",
        needles: &["googleprovider", "accounts.google.com", "google-auth", "signinwithgoogle"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "GitHub",
        needles: &["githubprovider", "github.com/login/oauth"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Django auth",
        needles: &["django.contrib.auth"],
    },
    AuthProbe {
        facet: Facet::Provider,
        label: "Flask-Login",
        needles: &["flask_login"],
    },
    // Flows
    AuthProbe {
        facet: Facet::Flow,
        label: "Login",
        needles: &["login", "signin", "sign_in", "authenticate("],
    },
    AuthProbe {
        facet: Facet::Flow,
        label: "Logout",
        needles: &["logout", "signout", "sign_out"],
    },
    AuthProbe {
        facet: Facet::Flow,
        label: "Registration",
        needles: &["signup", "sign_up", "registeruser", "register_user", "createuserwithemailandpassword", "/register"],
    },
    AuthProbe {
        facet: Facet::Flow,
        label: "Password reset",
        needles: &["resetpassword", "reset_password", "forgotpassword", "forgot_password", "sendpasswordresetemail"],
    },
    AuthProbe {
        facet: Facet::Flow,
        label: "Email verification",
        needles: &["verifyemail", "verify_email", "emailverified", "sendemailverification"],
    },
    AuthProbe {
        facet: Facet::Flow,
        label: "Token refresh",
        needles: &["refreshtoken", "refresh_token"],
    },
    AuthProbe {
        facet: Facet::Flow,
        label: "Route protection",
        needles: &[
            "requireauth",
            "isauthenticated",
            "protectedroute",
            "withauth",
            "@login_required",
            "authguard",
            "useguards",
            "authmiddleware",
        ],
    },
];

/// Run every probe against one file, accumulating into `signals`.
/// Returns whether anything matched.
pub fn probe_auth(file: &FileAnalysis, signals: &mut AuthFlowSignals) -> bool {
    let haystack = file.content.to_ascii_lowercase();
    let mut matched = false;

    for probe in AUTH_PROBES {
        if !probe.needles.iter().any(|n| haystack.contains(n)) {
            continue;
        }
        let set: &mut BTreeSet<String> = match probe.facet {
            Facet::Method => &mut signals.methods,
            Facet::Provider => &mut signals.providers,
            Facet::Flow => &mut signals.flows,
        };
        set.insert(probe.label.to_string());
        matched = true;
    }

    if matched {
        signals.files.insert(file.path.clone());
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::symbols::analyze_file;
    use crate::types::{FileNode, NodeCategory};

    fn analysis(path: &str, content: &str) -> FileAnalysis {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut node = FileNode::file(name, path, content.to_string());
        node.category = Some(NodeCategory::Source);
        analyze_file(&node)
    }

    #[test]
    fn test_next_auth_signals() {
        let file = analysis(
            "pages/api/auth/[...nextauth].ts",
            "import NextAuth from 'next-auth';\nimport GoogleProvider from 'next-auth/providers/google';\nexport default NextAuth({ providers: [GoogleProvider({})], session: { strategy: 'jwt' } });\n",
        );
        let mut signals = AuthFlowSignals::default();
        assert!(probe_auth(&file, &mut signals));
        assert!(signals.providers.contains("NextAuth"));
        assert!(signals.providers.contains("Google"));
        assert!(signals.files.contains("pages/api/auth/[...nextauth].ts"));
    }

    #[test]
    fn test_accumulates_across_files() {
        let mut signals = AuthFlowSignals::default();
        probe_auth(
            &analysis("src/auth.js", "const token = jwt.sign(payload, secret);\nexport function login() {}\n"),
            &mut signals,
        );
        probe_auth(
            &analysis("src/logout.js", "export function logout() { localStorage.clear(); }\n"),
            &mut signals,
        );
        assert_eq!(signals.methods.iter().collect::<Vec<_>>(), vec!["JWT"]);
        assert_eq!(signals.flows.iter().collect::<Vec<_>>(), vec!["Login", "Logout"]);
        assert_eq!(signals.files.len(), 2);
    }

    #[test]
    fn test_no_auth_is_empty() {
        let mut signals = AuthFlowSignals::default();
        assert!(!probe_auth(&analysis("src/math.ts", "export const add = (a, b) => a + b;"), &mut signals));
        assert!(signals.is_empty());
        assert!(signals.files.is_empty());
    }
}
