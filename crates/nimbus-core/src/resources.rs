// ── Resource registry ──
//
// Single source of truth for every collection the console manages.
// `for_each_resource!(callback)` expands `callback!` with one entry per
// resource; the model, dispatch and console modules each feed it their own
// callback so the kind enum, the message sum type and the per-resource
// registry can never drift apart.
//
// Entry shape:
//   Type => accessor { path, key, singular, plural, label }
//
// - `path`: REST collection path (`GET /firewall`) and change-event prefix
// - `key`: field holding the items in a `{key: [...], count}` list body
// - `singular` / `plural`: nouns used in alert messages
// - `label`: field shown when a record is summarized

macro_rules! for_each_resource {
    ($callback:ident) => {
        $callback! {
            Organization => organizations {
                path: "organization", key: "organizations",
                singular: "organization", plural: "organizations", label: name,
            },
            User => users {
                path: "user", key: "users",
                singular: "user", plural: "users", label: username,
            },
            Policy => policies {
                path: "policy", key: "policies",
                singular: "policy", plural: "policies", label: name,
            },
            Certificate => certificates {
                path: "certificate", key: "certificates",
                singular: "certificate", plural: "certificates", label: name,
            },
            Authority => authorities {
                path: "authority", key: "authorities",
                singular: "authority", plural: "authorities", label: name,
            },
            Secret => secrets {
                path: "secret", key: "secrets",
                singular: "secret", plural: "secrets", label: name,
            },
            Datacenter => datacenters {
                path: "datacenter", key: "datacenters",
                singular: "datacenter", plural: "datacenters", label: name,
            },
            Zone => zones {
                path: "zone", key: "zones",
                singular: "zone", plural: "zones", label: name,
            },
            Node => nodes {
                path: "node", key: "nodes",
                singular: "node", plural: "nodes", label: name,
            },
            Pool => pools {
                path: "pool", key: "pools",
                singular: "pool", plural: "pools", label: name,
            },
            Shape => shapes {
                path: "shape", key: "shapes",
                singular: "shape", plural: "shapes", label: name,
            },
            Plan => plans {
                path: "plan", key: "plans",
                singular: "plan", plural: "plans", label: name,
            },
            Storage => storages {
                path: "storage", key: "storages",
                singular: "storage", plural: "storages", label: name,
            },
            Image => images {
                path: "image", key: "images",
                singular: "image", plural: "images", label: name,
            },
            Disk => disks {
                path: "disk", key: "disks",
                singular: "disk", plural: "disks", label: name,
            },
            Instance => instances {
                path: "instance", key: "instances",
                singular: "instance", plural: "instances", label: name,
            },
            Pod => pods {
                path: "pod", key: "pods",
                singular: "pod", plural: "pods", label: name,
            },
            Service => services {
                path: "service", key: "services",
                singular: "service", plural: "services", label: name,
            },
            Vpc => vpcs {
                path: "vpc", key: "vpcs",
                singular: "VPC", plural: "VPCs", label: name,
            },
            Domain => domains {
                path: "domain", key: "domains",
                singular: "domain", plural: "domains", label: name,
            },
            Firewall => firewalls {
                path: "firewall", key: "firewalls",
                singular: "firewall", plural: "firewalls", label: name,
            },
            Block => blocks {
                path: "block", key: "blocks",
                singular: "block", plural: "blocks", label: name,
            },
            Balancer => balancers {
                path: "balancer", key: "balancers",
                singular: "load balancer", plural: "load balancers", label: name,
            },
            Log => logs {
                path: "log", key: "logs",
                singular: "log entry", plural: "logs", label: message,
            },
        }
    };
}
